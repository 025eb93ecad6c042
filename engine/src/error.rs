use thiserror::Error as DError;

#[derive(Debug, Clone, Eq, PartialEq, DError)]
pub enum ErrorKind {
    #[error("Indeterminate form 0/0")]
    IndeterminateForm,

    #[error("Couldn't get similarity, no matching ratings")]
    NoMatchingRatings,

    #[error("Couldn't get similarity, at least two matching ratings are needed")]
    NotEnoughPairs,

    #[error("Couldn't convert types")]
    ConvertType,
}
