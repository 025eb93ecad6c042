// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod models;
mod store;

use crate::models::{Movie, Rating, User};
use crate::store::Store;
use anyhow::Error;
use controller::{
    check_score,
    co_ratings::group_co_ratings,
    eid,
    error::ErrorKind,
    scores,
    seed::{read_movies, read_ratings, read_users, SeedMovie, SeedRating, SeedUser},
    CoRatings, Controller, Field, Score, SearchBy, Type, Value, SCORE_RANGE,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ratings kept in process memory, guarded by a `RwLock` so many readers can
/// predict at the same time while writers wait.
#[derive(Debug, Default)]
pub struct MemoryController {
    store: RwLock<Store>,
}

impl MemoryController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the `u.user`, `u.item` and `u.data` files found in `dir`
    pub fn from_seed(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();

        let controller = Self::from_records(
            read_users(dir.join("u.user"))?,
            read_movies(dir.join("u.item"))?,
            read_ratings(dir.join("u.data"))?,
        );

        log::info!("Loaded seed from {}", dir.display());
        Ok(controller)
    }

    /// Build a store from already parsed seed records, ratings that reference
    /// unknown entities, repeat a pair or fall outside of the score range are
    /// skipped
    pub fn from_records(
        users: Vec<SeedUser>,
        movies: Vec<SeedMovie>,
        ratings: Vec<SeedRating>,
    ) -> Self {
        let mut store = Store::default();

        for user in users {
            store.add_user(User {
                id: user.id,
                age: user.age,
                zipcode: user.zipcode,
                ..Default::default()
            });
        }

        for movie in movies {
            store.add_movie(Movie {
                id: movie.id,
                title: movie.title,
                released_at: movie.released_at,
                imdb_url: movie.imdb_url,
            });
        }

        let mut skipped = 0;
        for rating in ratings {
            let added = check_score(rating.score, SCORE_RANGE)
                .and_then(|score| store.add_rating(rating.user_id, rating.movie_id, score));

            if let Err(e) = added {
                log::warn!("Skipping seed rating: {}", e);
                skipped += 1;
            }
        }

        log::info!(
            "Stored {} users, {} movies and {} ratings ({} skipped)",
            store.users.len(),
            store.movies.len(),
            store.ratings_len(),
            skipped
        );

        Self {
            store: RwLock::new(store),
        }
    }

    /// Build a store straight from (user, movie, score) triples, users and
    /// movies are created on demand
    pub fn from_scores(scores: &[(i32, i32, Score)]) -> Result<Self, Error> {
        let mut store = Store::default();

        for (user_id, movie_id, score) in scores {
            if !store.users.contains_key(user_id) {
                store.add_user(User::with_id(*user_id));
            }

            if !store.movies.contains_key(movie_id) {
                store.add_movie(Movie::with_id(*movie_id));
            }

            store.add_rating(*user_id, *movie_id, check_score(*score, SCORE_RANGE)?)?;
        }

        Ok(Self {
            store: RwLock::new(store),
        })
    }

    /// Register a user keeping its id
    pub fn add_user(&self, user: User) -> Result<User, Error> {
        Ok(self.write()?.add_user(user))
    }

    /// Register a movie keeping its id
    pub fn add_movie(&self, movie: Movie) -> Result<Movie, Error> {
        Ok(self.write()?.add_movie(movie))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, ErrorKind> {
        self.store.read().map_err(|_| ErrorKind::PoisonedStore)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, ErrorKind> {
        self.store.write().map_err(|_| ErrorKind::PoisonedStore)
    }
}

fn optional_string(proto: &HashMap<&str, Value>, key: &str) -> Result<Option<String>, ErrorKind> {
    proto
        .get(key)
        .map(|value| value.as_string().map(str::to_owned))
        .transpose()
}

impl Controller for MemoryController {
    type User = User;
    type Movie = Movie;
    type Rating = Rating;

    fn users(&self) -> Result<Vec<Self::User>, Error> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn users_by(&self, by: &SearchBy) -> Result<Vec<Self::User>, Error> {
        let store = self.read()?;

        let users: Vec<_> = match by {
            SearchBy::Id(id) => {
                let id: i32 = id.parse()?;
                store.users.get(&id).cloned().into_iter().collect()
            }

            SearchBy::Name(email) => store
                .users
                .values()
                .filter(|user| user.email.as_ref() == Some(email))
                .cloned()
                .collect(),

            SearchBy::Custom(k, v) if k == "zipcode" => store
                .users
                .values()
                .filter(|user| user.zipcode.as_ref() == Some(v))
                .cloned()
                .collect(),

            SearchBy::Custom(k, v) => {
                return Err(ErrorKind::NotFoundByCustom(k.clone(), v.clone()).into())
            }
        };

        if users.is_empty() {
            Err(not_found(by).into())
        } else {
            Ok(users)
        }
    }

    fn movies(&self) -> Result<Vec<Self::Movie>, Error> {
        Ok(self.read()?.movies.values().cloned().collect())
    }

    fn movies_by(&self, by: &SearchBy) -> Result<Vec<Self::Movie>, Error> {
        let store = self.read()?;

        let movies: Vec<_> = match by {
            SearchBy::Id(id) => {
                let id: i32 = id.parse()?;
                store.movies.get(&id).cloned().into_iter().collect()
            }

            SearchBy::Name(title) => store
                .movies
                .values()
                .filter(|movie| &movie.title == title)
                .cloned()
                .collect(),

            SearchBy::Custom(k, v) => {
                return Err(ErrorKind::NotFoundByCustom(k.clone(), v.clone()).into())
            }
        };

        if movies.is_empty() {
            Err(not_found(by).into())
        } else {
            Ok(movies)
        }
    }

    fn ratings_by_user(&self, user_id: &eid!(Self::User)) -> Result<scores!(Self::Movie), Error> {
        Ok(self.read()?.ratings_by_user(*user_id))
    }

    fn ratings_for_movie(
        &self,
        movie_id: &eid!(Self::Movie),
    ) -> Result<scores!(Self::User), Error> {
        Ok(self.read()?.ratings_for_movie(*movie_id))
    }

    // Same grouping as the default, but every lookup sees the same snapshot
    fn co_ratings(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
    ) -> Result<CoRatings<eid!(Self::User)>, Error> {
        let store = self.read()?;
        let target = store.ratings_by_user(*user_id);
        let raters = store.ratings_for_movie(*movie_id);

        group_co_ratings(&target, &raters, |other| Ok(store.ratings_by_user(*other)))
    }

    fn fields_for_users(&self) -> Vec<Field> {
        vec![
            Field::Optional("email", Type::String),
            Field::Optional("password", Type::String),
            Field::Optional("age", Type::Int32),
            Field::Optional("zipcode", Type::String),
        ]
    }

    fn fields_for_movies(&self) -> Vec<Field> {
        vec![
            Field::Required("title", Type::String),
            Field::Optional("released_at", Type::DateTime),
            Field::Optional("imdb_url", Type::String),
        ]
    }

    fn insert_user<'a>(&self, proto: HashMap<&'a str, Value>) -> Result<Self::User, Error> {
        let mut store = self.write()?;

        let user = User {
            id: store.next_user_id(),
            email: optional_string(&proto, "email")?,
            password: optional_string(&proto, "password")?,
            age: proto.get("age").map(Value::as_i32).transpose()?,
            zipcode: optional_string(&proto, "zipcode")?,
        };

        Ok(store.add_user(user))
    }

    fn insert_movie<'a>(&self, proto: HashMap<&'a str, Value>) -> Result<Self::Movie, Error> {
        let mut store = self.write()?;

        let movie = Movie {
            id: store.next_movie_id(),
            title: optional_string(&proto, "title")?.ok_or(ErrorKind::MissingField("title"))?,
            released_at: proto
                .get("released_at")
                .map(Value::as_date_time)
                .transpose()?,
            imdb_url: optional_string(&proto, "imdb_url")?,
        };

        Ok(store.add_movie(movie))
    }

    fn insert_rating(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
        score: Score,
    ) -> Result<Self::Rating, Error> {
        check_score(score, self.score_range())?;

        Ok(self.write()?.add_rating(*user_id, *movie_id, score)?)
    }

    fn remove_rating(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
    ) -> Result<Self::Rating, Error> {
        Ok(self.write()?.remove_rating(*user_id, *movie_id)?)
    }
}

fn not_found(by: &SearchBy) -> ErrorKind {
    match by {
        SearchBy::Id(id) => ErrorKind::NotFoundById(id.clone()),
        SearchBy::Name(name) => ErrorKind::NotFoundByName(name.clone()),
        SearchBy::Custom(k, v) => ErrorKind::NotFoundByCustom(k.clone(), v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;
    use controller::Entity;

    fn controller() -> Result<MemoryController, Error> {
        MemoryController::from_scores(&[
            (1, 10, 5),
            (1, 11, 3),
            (2, 10, 4),
            (2, 11, 2),
            (2, 12, 4),
            (3, 10, 1),
            (3, 11, 5),
            (3, 12, 2),
        ])
    }

    // Forwards everything except `co_ratings`, which keeps the trait default
    struct Lookups<'a>(&'a MemoryController);

    impl Controller for Lookups<'_> {
        type User = User;
        type Movie = Movie;
        type Rating = Rating;

        fn users(&self) -> Result<Vec<User>, Error> {
            self.0.users()
        }

        fn users_by(&self, by: &SearchBy) -> Result<Vec<User>, Error> {
            self.0.users_by(by)
        }

        fn movies(&self) -> Result<Vec<Movie>, Error> {
            self.0.movies()
        }

        fn movies_by(&self, by: &SearchBy) -> Result<Vec<Movie>, Error> {
            self.0.movies_by(by)
        }

        fn ratings_by_user(&self, user_id: &i32) -> Result<Vec<(i32, Score)>, Error> {
            self.0.ratings_by_user(user_id)
        }

        fn ratings_for_movie(&self, movie_id: &i32) -> Result<Vec<(i32, Score)>, Error> {
            self.0.ratings_for_movie(movie_id)
        }

        fn fields_for_users(&self) -> Vec<Field> {
            self.0.fields_for_users()
        }

        fn fields_for_movies(&self) -> Vec<Field> {
            self.0.fields_for_movies()
        }

        fn insert_user<'a>(&self, proto: HashMap<&'a str, Value>) -> Result<User, Error> {
            self.0.insert_user(proto)
        }

        fn insert_movie<'a>(&self, proto: HashMap<&'a str, Value>) -> Result<Movie, Error> {
            self.0.insert_movie(proto)
        }

        fn insert_rating(
            &self,
            user_id: &i32,
            movie_id: &i32,
            score: Score,
        ) -> Result<Rating, Error> {
            self.0.insert_rating(user_id, movie_id, score)
        }

        fn remove_rating(&self, user_id: &i32, movie_id: &i32) -> Result<Rating, Error> {
            self.0.remove_rating(user_id, movie_id)
        }
    }

    #[test]
    fn snapshot_matches_default_co_ratings() -> Result<(), Error> {
        let controller = controller()?;
        let lookups = Lookups(&controller);

        for user_id in 1..=4 {
            for movie_id in 10..=13 {
                assert_eq!(
                    controller.co_ratings(&user_id, &movie_id)?,
                    lookups.co_ratings(&user_id, &movie_id)?
                );
            }
        }

        let snapshot = controller.co_ratings(&1, &12)?;
        assert_eq!(snapshot.paired_ratings[&2], vec![(4, 5), (2, 3)]);
        assert_eq!(snapshot.known_ratings[&3], 2);
        assert!(!snapshot.known_ratings.contains_key(&1));

        let with_self = controller.co_ratings(&2, &12)?;
        assert_eq!(with_self.paired_ratings[&2], vec![(4, 4), (2, 2), (4, 4)]);

        Ok(())
    }

    #[test]
    fn insert_prototypes() -> Result<(), Error> {
        let controller = controller()?;

        let mut proto = HashMap::new();
        proto.insert("email", Value::String("jessica@example.com".into()));
        proto.insert("age", Value::Int32(31));

        let user = controller.insert_user(proto)?;
        assert_eq!(user.get_id(), 4);
        assert_eq!(user.to_string(), "<User id=4 email=jessica@example.com>");

        let found = controller.users_by(&SearchBy::name("jessica@example.com"))?;
        assert_eq!(found, vec![user]);

        let mut proto = HashMap::new();
        proto.insert("title", Value::String("Heat".into()));
        let movie = controller.insert_movie(proto)?;
        assert_eq!(movie.get_id(), 13);

        assert!(controller.insert_movie(HashMap::new()).is_err());

        Ok(())
    }

    #[test]
    fn ratings_lifecycle() -> Result<(), Error> {
        let controller = controller()?;

        let rating = controller.insert_rating(&1, &12, 4)?;
        assert_eq!(
            rating.to_string(),
            "<Rating id=9 movie_id=12 user_id=1 score=4>"
        );

        assert!(controller.insert_rating(&1, &12, 2).is_err());
        assert!(controller.insert_rating(&1, &99, 2).is_err());
        assert!(controller.insert_rating(&2, &13, 0).is_err());

        let removed = controller.remove_rating(&1, &12)?;
        assert_eq!(removed, rating);
        assert_eq!(controller.ratings_by_user(&1)?, vec![(10, 5), (11, 3)]);

        Ok(())
    }

    #[test]
    fn seed_ratings_out_of_range_are_skipped() -> Result<(), Error> {
        let users = vec![SeedUser {
            id: 1,
            age: Some(24),
            zipcode: Some("85711".into()),
        }];

        let movie = |id, title: &str| SeedMovie {
            id,
            title: title.into(),
            released_at: None,
            imdb_url: None,
        };

        let movies = vec![movie(10, "Toy Story"), movie(11, "GoldenEye")];

        let rating = |movie_id, score| SeedRating {
            user_id: 1,
            movie_id,
            score,
        };

        let controller = MemoryController::from_records(
            users,
            movies,
            vec![rating(10, 9), rating(11, 4), rating(10, 0), rating(12, 3)],
        );

        assert_eq!(controller.ratings_by_user(&1)?, vec![(11, 4)]);
        assert!(controller.ratings_for_movie(&10)?.is_empty());

        Ok(())
    }

    #[test]
    fn scores_out_of_range_are_rejected() {
        assert!(MemoryController::from_scores(&[(1, 10, 9)]).is_err());
        assert!(MemoryController::from_scores(&[(1, 10, 0)]).is_err());
        assert!(MemoryController::from_scores(&[(1, 10, 5)]).is_ok());
    }

    #[test]
    fn unknown_ids_are_not_found() -> Result<(), Error> {
        let controller = controller()?;

        assert!(controller.users_by(&SearchBy::id("42")).is_err());
        assert!(controller.movies_by(&SearchBy::name("Alien")).is_err());
        assert!(controller.ratings_by_user(&42)?.is_empty());
        assert!(controller.ratings_for_movie(&42)?.is_empty());
        assert!(controller.co_ratings(&42, &10)?.is_empty());

        Ok(())
    }
}
