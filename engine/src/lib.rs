// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of movie-ratings.
//
// movie-ratings is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// movie-ratings is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with movie-ratings.  If not, see <http://www.gnu.org/licenses/>.

pub mod error;
pub mod similarity;
pub mod utils;

use anyhow::Error;
use config::{EngineConfig, SelfPairs};
use controller::{eid, CoRatings, Controller, Entity, Score};
use similarity::pearson;
use std::{cmp::Ordering, collections::HashMap};
use utils::common_keys_iter;

/// A user whose taste correlates positively with the target user
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<U> {
    pub id: U,
    pub similarity: f64,
    pub score: Score,
}

pub struct Engine<'a, C>
where
    C: Controller,
{
    controller: &'a C,
    self_pairs: SelfPairs,
}

impl<'a, C> Engine<'a, C>
where
    C: Controller,
{
    pub fn with_controller(controller: &'a C) -> Self {
        Self::from_config(controller, &EngineConfig::default())
    }

    pub fn from_config(controller: &'a C, config: &EngineConfig) -> Self {
        Self {
            controller,
            self_pairs: config.self_pairs,
        }
    }

    pub fn with_self_pairs(mut self, self_pairs: SelfPairs) -> Self {
        self.self_pairs = self_pairs;
        self
    }

    /// Co-ratings of `user` on `movie` with the self pair policy applied
    pub fn co_ratings(
        &self,
        user: &C::User,
        movie: &C::Movie,
    ) -> Result<CoRatings<eid!(C::User)>, Error> {
        let user_id = user.get_id();
        let mut co_ratings = self.controller.co_ratings(&user_id, &movie.get_id())?;

        if self.self_pairs == SelfPairs::Exclude {
            co_ratings.remove(&user_id);
        }

        Ok(co_ratings)
    }

    /// Pearson correlation between the scores both users gave to the same movies
    pub fn user_similarity(&self, user_a: &C::User, user_b: &C::User) -> Result<Option<f64>, Error> {
        let ratings_a: HashMap<_, _> = self
            .controller
            .ratings_by_user(&user_a.get_id())?
            .into_iter()
            .collect();

        let ratings_b: HashMap<_, _> = self
            .controller
            .ratings_by_user(&user_b.get_id())?
            .into_iter()
            .collect();

        let pairs: Vec<(Score, Score)> = common_keys_iter(&ratings_a, &ratings_b)
            .map(|(_, (a, b))| (*a, *b))
            .collect();

        Ok(pearson(&pairs))
    }

    /// Users who rated `movie` and correlate positively with `user`, most
    /// similar first
    pub fn neighbors(
        &self,
        user: &C::User,
        movie: &C::Movie,
    ) -> Result<Vec<Neighbor<eid!(C::User)>>, Error> {
        let co_ratings = self.co_ratings(user, movie)?;

        let mut neighbors = Vec::new();
        for (id, score, pairs) in co_ratings.neighbors() {
            match pearson(pairs) {
                Some(similarity) if similarity > 0.0 => neighbors.push(Neighbor {
                    id: id.clone(),
                    similarity,
                    score,
                }),

                similarity => log::debug!(
                    "Discarding user({}) for user({}), similarity {:?}",
                    id,
                    user.get_id(),
                    similarity
                ),
            }
        }

        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });

        Ok(neighbors)
    }

    /// Predict the score `user` would give to `movie`, `None` when no
    /// positively correlated neighbor rated it
    pub fn predict_rating(&self, user: &C::User, movie: &C::Movie) -> Result<Option<f64>, Error> {
        let similarities: Vec<_> = self
            .neighbors(user, movie)?
            .into_iter()
            .map(|neighbor| (neighbor.similarity, neighbor.score))
            .collect();

        let prediction = weighted_average(&similarities);
        log::debug!(
            "Prediction for user({}) on movie({}) from {} neighbors: {:?}",
            user.get_id(),
            movie.get_id(),
            similarities.len(),
            prediction
        );

        Ok(prediction)
    }
}

/// Similarity weighted mean of `(similarity, score)`, only strictly positive
/// similarities take part
pub fn weighted_average(similarities: &[(f64, Score)]) -> Option<f64> {
    let mut numerator = 0.0;
    let mut denominator = None;

    for (similarity, score) in similarities.iter().filter(|(sim, _)| *sim > 0.0) {
        numerator += f64::from(*score) * similarity;
        *denominator.get_or_insert(0.0) += similarity;
    }

    denominator.map(|denominator| numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;
    use assert_approx_eq::*;
    use controller::SearchBy;
    use ratings_memory::{
        models::{Movie, User},
        MemoryController,
    };

    fn user(controller: &MemoryController, id: i32) -> Result<User, Error> {
        Ok(controller.users_by(&SearchBy::id(&id.to_string()))?.remove(0))
    }

    fn movie(controller: &MemoryController, id: i32) -> Result<Movie, Error> {
        Ok(controller.movies_by(&SearchBy::id(&id.to_string()))?.remove(0))
    }

    #[test]
    fn equal_weights_average_scores() {
        let prediction = weighted_average(&[(0.5, 3), (0.5, 5)]);
        assert_approx_eq!(prediction.unwrap(), 4.0);
    }

    #[test]
    fn weights_favor_similar_users() {
        let prediction = weighted_average(&[(0.9, 5), (0.1, 1)]);
        assert_approx_eq!(prediction.unwrap(), 4.6);
    }

    #[test]
    fn non_positive_weights_are_ignored() {
        let prediction = weighted_average(&[(0.5, 3), (-1.0, 1), (0.0, 1)]);
        assert_approx_eq!(prediction.unwrap(), 3.0);

        assert!(weighted_average(&[(-0.2, 5), (0.0, 4)]).is_none());
        assert!(weighted_average(&[]).is_none());
    }

    #[test]
    fn single_identical_neighbor() -> Result<(), Error> {
        // 1 and 2 agree on movies 10 and 11, 3 disagrees
        let controller = MemoryController::from_scores(&[
            (1, 10, 2),
            (1, 11, 4),
            (2, 10, 2),
            (2, 11, 4),
            (2, 12, 4),
            (3, 10, 5),
            (3, 11, 1),
        ])?;

        let engine = Engine::with_controller(&controller);
        let prediction = engine.predict_rating(&user(&controller, 1)?, &movie(&controller, 12)?)?;

        assert_approx_eq!(prediction.unwrap(), 4.0);

        Ok(())
    }

    #[test]
    fn anticorrelated_neighbor_has_no_influence() -> Result<(), Error> {
        let controller = MemoryController::from_scores(&[
            (1, 10, 1),
            (1, 11, 3),
            (1, 12, 5),
            (2, 10, 1),
            (2, 11, 3),
            (2, 12, 5),
            (2, 13, 3),
            (3, 10, 5),
            (3, 11, 3),
            (3, 12, 1),
            (3, 13, 1),
        ])?;

        let engine = Engine::with_controller(&controller);
        let target = user(&controller, 1)?;
        let movie = movie(&controller, 13)?;

        let neighbors = engine.neighbors(&target, &movie)?;
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].id, 2);

        let prediction = engine.predict_rating(&target, &movie)?;
        assert_approx_eq!(prediction.unwrap(), 3.0);

        Ok(())
    }

    #[test]
    fn user_similarity_uses_common_movies() -> Result<(), Error> {
        let controller = MemoryController::from_scores(&[
            (1, 10, 1),
            (1, 11, 2),
            (1, 12, 3),
            (2, 10, 2),
            (2, 11, 3),
            (2, 12, 4),
            (2, 13, 1),
            (3, 13, 5),
        ])?;

        let engine = Engine::with_controller(&controller);
        let one = user(&controller, 1)?;
        let two = user(&controller, 2)?;
        let three = user(&controller, 3)?;

        assert_approx_eq!(engine.user_similarity(&one, &two)?.unwrap(), 1.0);
        assert_approx_eq!(engine.user_similarity(&two, &one)?.unwrap(), 1.0);
        assert!(engine.user_similarity(&one, &three)?.is_none());

        Ok(())
    }

    #[test]
    fn self_pairs_follow_configuration() -> Result<(), Error> {
        let controller = MemoryController::from_scores(&[
            (1, 10, 1),
            (1, 11, 5),
            (1, 12, 2),
            (2, 10, 1),
            (2, 11, 4),
            (2, 12, 4),
        ])?;

        let target = user(&controller, 1)?;
        let movie = movie(&controller, 12)?;

        let excluding = Engine::with_controller(&controller);
        let co_ratings = excluding.co_ratings(&target, &movie)?;
        assert!(!co_ratings.known_ratings.contains_key(&1));
        assert_eq!(co_ratings.paired_ratings[&2], vec![(1, 1), (4, 5), (4, 2)]);

        let including = Engine::from_config(
            &controller,
            &EngineConfig {
                self_pairs: SelfPairs::Include,
            },
        );
        let co_ratings = including.co_ratings(&target, &movie)?;
        assert_eq!(co_ratings.known_ratings[&1], 2);
        assert_eq!(co_ratings.paired_ratings[&1], vec![(1, 1), (5, 5), (2, 2)]);

        let neighbors = including.neighbors(&target, &movie)?;
        assert_eq!(neighbors[0].id, 1);
        assert_approx_eq!(neighbors[0].similarity, 1.0);

        Ok(())
    }
}
