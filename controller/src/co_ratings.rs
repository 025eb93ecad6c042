// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{Result, Score};
use std::{collections::HashMap, hash::Hash};

/// Everything needed to predict how a target user would score a target movie.
///
/// `known_ratings` maps each neighbor to the score they gave the target movie,
/// `paired_ratings` maps each neighbor to `(neighbor score, target score)` for
/// every movie both of them rated, in the neighbor's rating order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoRatings<U: Hash + Eq> {
    pub known_ratings: HashMap<U, Score>,
    pub paired_ratings: HashMap<U, Vec<(Score, Score)>>,
}

impl<U: Hash + Eq> Default for CoRatings<U> {
    fn default() -> Self {
        Self {
            known_ratings: HashMap::new(),
            paired_ratings: HashMap::new(),
        }
    }
}

impl<U: Hash + Eq> CoRatings<U> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one row of the co-rating join: `user` gave `pair.0` to a movie
    /// the target scored `pair.1`, and `movie_score` to the target movie
    pub fn push(&mut self, user: U, pair: (Score, Score), movie_score: Score)
    where
        U: Clone,
    {
        self.paired_ratings
            .entry(user.clone())
            .or_insert_with(Vec::new)
            .push(pair);

        self.known_ratings.insert(user, movie_score);
    }

    /// Drop `user` from both mappings
    pub fn remove(&mut self, user: &U) {
        self.known_ratings.remove(user);
        self.paired_ratings.remove(user);
    }

    pub fn len(&self) -> usize {
        self.known_ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_ratings.is_empty()
    }

    /// Iterate over (neighbor, score on the target movie, paired scores)
    pub fn neighbors(&self) -> impl Iterator<Item = (&U, Score, &[(Score, Score)])> + '_ {
        self.known_ratings.iter().map(move |(user, score)| {
            let pairs = self
                .paired_ratings
                .get(user)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            (user, *score, pairs)
        })
    }
}

/// Build co-ratings from plain per-user and per-movie lookups.
///
/// `target` holds the target user's scores, `raters` the scores received by the
/// target movie, and `ratings_of` fetches every score given by one rater.
/// Raters without any movie in common with the target user are left out, the
/// same way an inner join would leave them out.
pub fn group_co_ratings<U, M, F>(
    target: &[(M, Score)],
    raters: &[(U, Score)],
    mut ratings_of: F,
) -> Result<CoRatings<U>>
where
    U: Hash + Eq + Clone,
    M: Hash + Eq,
    F: FnMut(&U) -> Result<Vec<(M, Score)>>,
{
    let mut co_ratings = CoRatings::new();
    if target.is_empty() || raters.is_empty() {
        return Ok(co_ratings);
    }

    let target: HashMap<&M, Score> = target.iter().map(|(movie, score)| (movie, *score)).collect();

    for (other, movie_score) in raters {
        for (movie, score) in ratings_of(other)? {
            if let Some(target_score) = target.get(&movie) {
                co_ratings.push(other.clone(), (score, *target_score), *movie_score);
            }
        }
    }

    Ok(co_ratings)
}
