// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::models::{Movie, Rating, User};
use controller::{error::ErrorKind, Score};
use std::collections::{BTreeMap, HashMap};

/// Plain tables plus the user => ratings and movie => ratings back references.
///
/// Rating ids only grow, so every back reference list stays sorted by id.
#[derive(Debug, Default)]
pub(crate) struct Store {
    pub(crate) users: BTreeMap<i32, User>,
    pub(crate) movies: BTreeMap<i32, Movie>,
    ratings: BTreeMap<i32, Rating>,
    by_user: HashMap<i32, Vec<i32>>,
    by_movie: HashMap<i32, Vec<i32>>,
    last_rating_id: i32,
}

impl Store {
    pub(crate) fn next_user_id(&self) -> i32 {
        self.users.keys().next_back().map_or(1, |id| id + 1)
    }

    pub(crate) fn next_movie_id(&self) -> i32 {
        self.movies.keys().next_back().map_or(1, |id| id + 1)
    }

    pub(crate) fn add_user(&mut self, user: User) -> User {
        self.users.insert(user.id, user.clone());
        user
    }

    pub(crate) fn add_movie(&mut self, movie: Movie) -> Movie {
        self.movies.insert(movie.id, movie.clone());
        movie
    }

    pub(crate) fn add_rating(
        &mut self,
        user_id: i32,
        movie_id: i32,
        score: Score,
    ) -> Result<Rating, ErrorKind> {
        if !self.users.contains_key(&user_id) {
            return Err(ErrorKind::NotFoundById(user_id.to_string()));
        }

        if !self.movies.contains_key(&movie_id) {
            return Err(ErrorKind::NotFoundById(movie_id.to_string()));
        }

        if self.find_rating(user_id, movie_id).is_some() {
            return Err(ErrorKind::DuplicateRating(
                user_id.to_string(),
                movie_id.to_string(),
            ));
        }

        self.last_rating_id += 1;
        let rating = Rating {
            id: self.last_rating_id,
            user_id,
            movie_id,
            score,
        };

        self.ratings.insert(rating.id, rating);
        self.by_user.entry(user_id).or_default().push(rating.id);
        self.by_movie.entry(movie_id).or_default().push(rating.id);

        Ok(rating)
    }

    pub(crate) fn remove_rating(&mut self, user_id: i32, movie_id: i32) -> Result<Rating, ErrorKind> {
        let rating_id = self
            .find_rating(user_id, movie_id)
            .ok_or_else(|| ErrorKind::RatingNotFound(user_id.to_string(), movie_id.to_string()))?;

        if let Some(ids) = self.by_user.get_mut(&user_id) {
            ids.retain(|id| *id != rating_id);
        }

        if let Some(ids) = self.by_movie.get_mut(&movie_id) {
            ids.retain(|id| *id != rating_id);
        }

        self.ratings
            .remove(&rating_id)
            .ok_or_else(|| ErrorKind::RatingNotFound(user_id.to_string(), movie_id.to_string()))
    }

    /// Scores given by `user_id` as (movie, score)
    pub(crate) fn ratings_by_user(&self, user_id: i32) -> Vec<(i32, Score)> {
        self.collect(self.by_user.get(&user_id), |rating| {
            (rating.movie_id, rating.score)
        })
    }

    /// Scores received by `movie_id` as (user, score)
    pub(crate) fn ratings_for_movie(&self, movie_id: i32) -> Vec<(i32, Score)> {
        self.collect(self.by_movie.get(&movie_id), |rating| {
            (rating.user_id, rating.score)
        })
    }

    pub(crate) fn ratings_len(&self) -> usize {
        self.ratings.len()
    }

    fn find_rating(&self, user_id: i32, movie_id: i32) -> Option<i32> {
        self.by_user
            .get(&user_id)?
            .iter()
            .copied()
            .find(|id| self.ratings[id].movie_id == movie_id)
    }

    fn collect<F>(&self, ids: Option<&Vec<i32>>, f: F) -> Vec<(i32, Score)>
    where
        F: Fn(&Rating) -> (i32, Score),
    {
        ids.map(|ids| ids.iter().map(|id| f(&self.ratings[id])).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        let mut store = Store::default();
        for id in 1..=3 {
            store.add_user(User::with_id(id));
            store.add_movie(Movie::with_id(id * 10));
        }

        store
    }

    #[test]
    fn back_references_keep_rating_order() -> Result<(), ErrorKind> {
        let mut store = store();
        store.add_rating(1, 30, 2)?;
        store.add_rating(2, 30, 5)?;
        store.add_rating(1, 10, 4)?;

        assert_eq!(store.ratings_by_user(1), vec![(30, 2), (10, 4)]);
        assert_eq!(store.ratings_for_movie(30), vec![(1, 2), (2, 5)]);
        assert!(store.ratings_for_movie(20).is_empty());

        Ok(())
    }

    #[test]
    fn ratings_need_existing_user_and_movie() {
        let mut store = store();

        assert!(store.add_rating(9, 10, 3).is_err());
        assert!(store.add_rating(1, 99, 3).is_err());
        assert_eq!(store.ratings_len(), 0);
    }

    #[test]
    fn second_rating_for_same_pair_is_rejected() -> Result<(), ErrorKind> {
        let mut store = store();
        store.add_rating(1, 10, 3)?;

        match store.add_rating(1, 10, 5) {
            Err(ErrorKind::DuplicateRating(..)) => {}
            other => panic!("expected duplicate rating, got {:?}", other),
        }

        assert_eq!(store.ratings_by_user(1), vec![(10, 3)]);

        Ok(())
    }

    #[test]
    fn removing_updates_both_indices() -> Result<(), ErrorKind> {
        let mut store = store();
        store.add_rating(1, 10, 3)?;
        store.add_rating(2, 10, 4)?;

        let removed = store.remove_rating(1, 10)?;
        assert_eq!(removed.score, 3);

        assert!(store.ratings_by_user(1).is_empty());
        assert_eq!(store.ratings_for_movie(10), vec![(2, 4)]);
        assert!(store.remove_rating(1, 10).is_err());

        Ok(())
    }

    #[test]
    fn ids_continue_after_the_largest() {
        let mut store = Store::default();
        assert_eq!(store.next_user_id(), 1);

        store.add_user(User::with_id(41));
        assert_eq!(store.next_user_id(), 42);
        assert_eq!(store.next_movie_id(), 1);
    }
}
