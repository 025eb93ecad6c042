// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use thiserror::Error as DError;

#[derive(Debug, Clone, DError)]
pub enum ErrorKind {
    #[error("Couldn't found entity with id({0})")]
    NotFoundById(String),

    #[error("Couldn't found entity with name({0})")]
    NotFoundByName(String),

    #[error("Couldn't found entity with {0}({1})")]
    NotFoundByCustom(String, String),

    #[error("Failed to cast to some value ({0})")]
    ValueConvert(String),

    #[error("Couldn't cast value to {0}")]
    CastingValue(&'static str),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Score {0} is outside of range [{1}, {2}]")]
    ScoreOutOfRange(i32, i32, i32),

    #[error("User({0}) already rated item({1})")]
    DuplicateRating(String, String),

    #[error("Couldn't insert rating for user({0}) on item({1})")]
    InsertRatingFailed(String, String),

    #[error("Couldn't find a rating for user({0}) on item({1})")]
    RatingNotFound(String, String),

    #[error("Storage lock was poisoned")]
    PoisonedStore,

    #[error("Invalid seed record at line {0}: {1}")]
    InvalidSeedRecord(u64, String),
}
