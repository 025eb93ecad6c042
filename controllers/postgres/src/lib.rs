// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

#[macro_use]
extern crate diesel;

pub mod models;
pub mod schema;

use crate::models::{
    movies::{Movie, NewMovie},
    ratings::{CoRatingRow, NewRating, Rating},
    users::{NewUser, User},
};
use crate::schema::{movies, ratings, users};
use anyhow::Error;
use config::Config;
use controller::{
    check_score, eid, error::ErrorKind, scores, CoRatings, Controller, Field, Score, SearchBy,
    Type, Value,
};
use diesel::pg::{Pg, PgConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Integer;
use diesel::{debug_query, delete, insert_into, prelude::*, sql_query};
use std::collections::HashMap;

// R is any rating, UM pairs it with the target user's rating on the same movie
// and MU keeps only the raters of the target movie
const CO_RATINGS_QUERY: &str = "\
    SELECT r.user_id AS user_id, r.score AS score, \
           um.score AS target_score, mu.score AS movie_score \
    FROM ratings r \
    JOIN ratings um ON um.movie_id = r.movie_id \
    JOIN ratings mu ON mu.user_id = r.user_id \
    WHERE um.user_id = $1 AND mu.movie_id = $2 \
    ORDER BY r.id";

pub fn establish_connection(url: &str) -> Result<PgConnection, Error> {
    Ok(PgConnection::establish(&url)?)
}

pub struct PgController {
    pg_conn: PgConnection,
}

impl PgController {
    pub fn new() -> Result<Self, Error> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::with_url(&config.database.psql_url)
    }

    pub fn with_url(url: &str) -> Result<Self, Error> {
        let pg_conn = establish_connection(url)?;
        Ok(Self { pg_conn })
    }

    pub fn connection(&self) -> &PgConnection {
        &self.pg_conn
    }
}

fn optional_str<'a>(
    proto: &'a HashMap<&str, Value>,
    key: &str,
) -> Result<Option<&'a str>, ErrorKind> {
    proto.get(key).map(Value::as_string).transpose()
}

impl Controller for PgController {
    type User = User;
    type Movie = Movie;
    type Rating = Rating;

    fn users(&self) -> Result<Vec<Self::User>, Error> {
        let users = users::table.order(users::id).load::<User>(&self.pg_conn)?;
        Ok(users)
    }

    fn users_by(&self, by: &SearchBy) -> Result<Vec<Self::User>, Error> {
        let users: Vec<User> = match by {
            SearchBy::Id(id) => {
                let id: i32 = id.parse()?;
                users::table.filter(users::id.eq(id)).load(&self.pg_conn)?
            }

            // Users have no name, they log in with their email
            SearchBy::Name(email) => users::table
                .filter(users::email.eq(email))
                .load(&self.pg_conn)?,

            SearchBy::Custom(k, v) if k == "zipcode" => users::table
                .filter(users::zipcode.eq(v))
                .load(&self.pg_conn)?,

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
        let movies = movies::table
            .order(movies::id)
            .load::<Movie>(&self.pg_conn)?;

        Ok(movies)
    }

    fn movies_by(&self, by: &SearchBy) -> Result<Vec<Self::Movie>, Error> {
        let movies: Vec<Movie> = match by {
            SearchBy::Id(id) => {
                let id: i32 = id.parse()?;
                movies::table
                    .filter(movies::id.eq(id))
                    .load(&self.pg_conn)?
            }

            SearchBy::Name(title) => movies::table
                .filter(movies::title.eq(title))
                .load(&self.pg_conn)?,

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
        let query = ratings::table
            .filter(ratings::user_id.eq(user_id))
            .order(ratings::id)
            .select((ratings::movie_id, ratings::score));

        log::debug!("{}", debug_query::<Pg, _>(&query));
        Ok(query.load::<(i32, Score)>(&self.pg_conn)?)
    }

    fn ratings_for_movie(
        &self,
        movie_id: &eid!(Self::Movie),
    ) -> Result<scores!(Self::User), Error> {
        let query = ratings::table
            .filter(ratings::movie_id.eq(movie_id))
            .order(ratings::id)
            .select((ratings::user_id, ratings::score));

        log::debug!("{}", debug_query::<Pg, _>(&query));
        Ok(query.load::<(i32, Score)>(&self.pg_conn)?)
    }

    // Single statement, so every row comes from the same snapshot
    fn co_ratings(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
    ) -> Result<CoRatings<eid!(Self::User)>, Error> {
        let query = sql_query(CO_RATINGS_QUERY)
            .bind::<Integer, _>(*user_id)
            .bind::<Integer, _>(*movie_id);

        log::debug!("{}", debug_query::<Pg, _>(&query));
        let rows = query.load::<CoRatingRow>(&self.pg_conn)?;

        let mut co_ratings = CoRatings::new();
        for row in rows {
            co_ratings.push(row.user_id, (row.score, row.target_score), row.movie_score);
        }

        Ok(co_ratings)
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
        let user = NewUser {
            id: None,
            email: optional_str(&proto, "email")?,
            password: optional_str(&proto, "password")?,
            age: proto.get("age").map(Value::as_i32).transpose()?,
            zipcode: optional_str(&proto, "zipcode")?,
        };

        Ok(insert_into(users::table)
            .values(&user)
            .get_result(&self.pg_conn)?)
    }

    fn insert_movie<'a>(&self, proto: HashMap<&'a str, Value>) -> Result<Self::Movie, Error> {
        let movie = NewMovie {
            id: None,
            title: optional_str(&proto, "title")?.ok_or(ErrorKind::MissingField("title"))?,
            released_at: proto
                .get("released_at")
                .map(Value::as_date_time)
                .transpose()?,
            imdb_url: optional_str(&proto, "imdb_url")?,
        };

        Ok(insert_into(movies::table)
            .values(&movie)
            .get_result(&self.pg_conn)?)
    }

    fn insert_rating(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
        score: Score,
    ) -> Result<Self::Rating, Error> {
        check_score(score, self.score_range())?;

        let new_rating = NewRating {
            user_id: *user_id,
            movie_id: *movie_id,
            score,
        };

        let result = insert_into(ratings::table)
            .values(&new_rating)
            .get_result(&self.pg_conn);

        match result {
            Ok(rating) => Ok(rating),

            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(ErrorKind::DuplicateRating(user_id.to_string(), movie_id.to_string()).into())
            }

            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Err(ErrorKind::InsertRatingFailed(user_id.to_string(), movie_id.to_string()).into())
            }

            Err(e) => Err(e.into()),
        }
    }

    fn remove_rating(
        &self,
        user_id: &eid!(Self::User),
        movie_id: &eid!(Self::Movie),
    ) -> Result<Self::Rating, Error> {
        let target = ratings::table
            .filter(ratings::user_id.eq(user_id))
            .filter(ratings::movie_id.eq(movie_id));

        delete(target)
            .get_result::<Rating>(&self.pg_conn)
            .optional()?
            .ok_or_else(|| {
                ErrorKind::RatingNotFound(user_id.to_string(), movie_id.to_string()).into()
            })
    }
}

fn not_found(by: &SearchBy) -> ErrorKind {
    match by {
        SearchBy::Id(id) => ErrorKind::NotFoundById(id.clone()),
        SearchBy::Name(name) => ErrorKind::NotFoundByName(name.clone()),
        SearchBy::Custom(k, v) => ErrorKind::NotFoundByCustom(k.clone(), v.clone()),
    }
}

#[cfg(feature = "test-controller")]
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;
    use controller::{co_ratings::group_co_ratings, Entity};
    use diesel::connection::Connection;
    use std::collections::HashMap;

    fn test_controller() -> Result<PgController, Error> {
        let vars: HashMap<String, String> = dotenv::vars().collect();
        let url = vars
            .get("DATABASE_URL")
            .cloned()
            .unwrap_or_else(|| Config::default().database.psql_url);

        let controller = PgController::with_url(&url)?;
        controller.connection().begin_test_transaction()?;
        Ok(controller)
    }

    fn insert_fixture(controller: &PgController) -> Result<(Vec<i32>, Vec<i32>), Error> {
        let mut users = Vec::new();
        for email in &["a@test.com", "b@test.com", "c@test.com"] {
            let mut proto = HashMap::new();
            proto.insert("email", Value::String(email.to_string()));
            users.push(controller.insert_user(proto)?.get_id());
        }

        let mut movies = Vec::new();
        for title in &["Alpha", "Beta", "Gamma"] {
            let mut proto = HashMap::new();
            proto.insert("title", Value::String(title.to_string()));
            movies.push(controller.insert_movie(proto)?.get_id());
        }

        let scores = [
            (0, 0, 5),
            (0, 1, 3),
            (1, 0, 4),
            (1, 1, 2),
            (1, 2, 4),
            (2, 0, 1),
            (2, 1, 5),
            (2, 2, 2),
        ];

        for (user, movie, score) in scores.iter() {
            controller.insert_rating(&users[*user], &movies[*movie], *score)?;
        }

        Ok((users, movies))
    }

    #[test]
    fn query_user_by_email() -> Result<(), Error> {
        let controller = test_controller()?;
        let (users, _) = insert_fixture(&controller)?;

        let found = controller.users_by(&SearchBy::name("b@test.com"))?;
        assert_eq!(found[0].get_id(), users[1]);

        Ok(())
    }

    #[test]
    fn ratings_follow_rating_order() -> Result<(), Error> {
        let controller = test_controller()?;
        let (users, movies) = insert_fixture(&controller)?;

        let ratings = controller.ratings_by_user(&users[1])?;
        assert_eq!(ratings, vec![(movies[0], 4), (movies[1], 2), (movies[2], 4)]);

        let raters = controller.ratings_for_movie(&movies[2])?;
        assert_eq!(raters, vec![(users[1], 4), (users[2], 2)]);

        Ok(())
    }

    #[test]
    fn join_matches_grouped_lookups() -> Result<(), Error> {
        let controller = test_controller()?;
        let (users, movies) = insert_fixture(&controller)?;

        let joined = controller.co_ratings(&users[0], &movies[2])?;

        let target = controller.ratings_by_user(&users[0])?;
        let raters = controller.ratings_for_movie(&movies[2])?;
        let grouped =
            group_co_ratings(&target, &raters, |other| controller.ratings_by_user(other))?;

        assert_eq!(joined, grouped);
        assert_eq!(joined.paired_ratings[&users[1]], vec![(4, 5), (2, 3)]);

        Ok(())
    }

    #[test]
    fn duplicate_rating_is_rejected() -> Result<(), Error> {
        let controller = test_controller()?;
        let (users, movies) = insert_fixture(&controller)?;

        assert!(controller.insert_rating(&users[0], &movies[0], 1).is_err());

        Ok(())
    }

    #[test]
    fn remove_rating_returns_deleted_row() -> Result<(), Error> {
        let controller = test_controller()?;
        let (users, movies) = insert_fixture(&controller)?;

        let removed = controller.remove_rating(&users[2], &movies[2])?;
        assert_eq!(removed.score, 2);
        assert!(controller.remove_rating(&users[2], &movies[2]).is_err());

        Ok(())
    }
}
