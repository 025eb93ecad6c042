// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod co_ratings;
pub mod entity;
pub mod error;
pub mod searchby;
pub mod seed;
pub mod values;

#[macro_export]
macro_rules! eid {
    ($e:ty) => {
        <$e as $crate::entity::Entity>::Id
    };
}

#[macro_export]
macro_rules! scores {
    ($e:ty) => {
        $crate::Scores<$crate::eid!($e)>
    };
}

use anyhow::Error;
use error::ErrorKind;
use std::collections::HashMap;

pub use co_ratings::CoRatings;
pub use entity::{Entity, ToTable};
pub use searchby::SearchBy;
pub use values::{Field, Type, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Scores are whole numbers on the controller scale, see `Controller::score_range`
pub type Score = i32;

/// Sequence of (id, score) ordered by rating id
pub type Scores<K> = Vec<(K, Score)>;

/// Default (min_rating, max_rating) of every controller
pub const SCORE_RANGE: (Score, Score) = (1, 5);

/// Reject scores outside of the inclusive `(min, max)` range
pub fn check_score(
    score: Score,
    (min, max): (Score, Score),
) -> std::result::Result<Score, ErrorKind> {
    if score < min || score > max {
        Err(ErrorKind::ScoreOutOfRange(score, min, max))
    } else {
        Ok(score)
    }
}

pub trait Controller {
    type User: Entity;
    type Movie: Entity;
    type Rating: Entity;

    /// Get all users
    fn users(&self) -> Result<Vec<Self::User>>;

    /// Get users that matched the search criteria by id, name or custom (if implemented)
    fn users_by(&self, by: &SearchBy) -> Result<Vec<Self::User>>;

    /// Get all movies
    fn movies(&self) -> Result<Vec<Self::Movie>>;

    /// Get movies that matched the search criteria by id, name (title) or custom (if implemented)
    fn movies_by(&self, by: &SearchBy) -> Result<Vec<Self::Movie>>;

    /// Get the scores given by the specified user, i.e. Movie::Id => score
    fn ratings_by_user(&self, user_id: &eid!(Self::User)) -> Result<scores!(Self::Movie)>;

    /// Get the scores received by the specified movie, i.e. User::Id => score
    fn ratings_for_movie(&self, movie_id: &eid!(Self::Movie)) -> Result<scores!(Self::User)>;

    /// Get the users who rated `movie_id` together with the scores they share
    /// with `user_id`, the target user is not filtered out
    fn co_ratings(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
    ) -> Result<CoRatings<eid!(Self::User)>> {
        let target = self.ratings_by_user(user_id)?;
        let raters = self.ratings_for_movie(movie_id)?;

        co_ratings::group_co_ratings(&target, &raters, |other| self.ratings_by_user(other))
    }

    /// The controller score range, ex. (1, 5) is (min_rating, max_rating)
    fn score_range(&self) -> (Score, Score) {
        SCORE_RANGE
    }

    /// Return a list of fields required to insert a new user
    fn fields_for_users(&self) -> Vec<Field>;

    /// Return a list of fields required to insert a new movie
    fn fields_for_movies(&self) -> Vec<Field>;

    /// Insert a new user from a prototype
    fn insert_user<'a>(&self, proto: HashMap<&'a str, Value>) -> Result<Self::User>;

    /// Insert a new movie from a prototype
    fn insert_movie<'a>(&self, proto: HashMap<&'a str, Value>) -> Result<Self::Movie>;

    /// Create a rating of user for a movie, ratings can't be modified afterwards
    fn insert_rating(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
        score: Score,
    ) -> Result<Self::Rating>;

    /// Remove the rating of user for a movie
    fn remove_rating(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
    ) -> Result<Self::Rating>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_checked_inclusively() {
        assert_eq!(check_score(1, SCORE_RANGE).ok(), Some(1));
        assert_eq!(check_score(5, SCORE_RANGE).ok(), Some(5));

        match check_score(9, SCORE_RANGE) {
            Err(ErrorKind::ScoreOutOfRange(9, 1, 5)) => {}
            other => panic!("expected score out of range, got {:?}", other),
        }

        assert!(check_score(0, (1, 10)).is_err());
    }
}
