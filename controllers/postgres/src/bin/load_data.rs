// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use config::Config;
use controller::seed::{read_movies, read_ratings, read_users};
use diesel::pg::PgConnection;
use diesel::{insert_into, prelude::*, sql_query};
use indicatif::ProgressIterator;
use ratings_pg::establish_connection;
use ratings_pg::models::{movies::NewMovie, ratings::NewRating, users::NewUser};
use ratings_pg::schema::{movies, ratings, users};
use std::collections::HashMap;
use std::path::Path;

const CHUNK_SIZE: usize = 5_000;

fn insert_users(conn: &PgConnection, seed_dir: &Path) -> Result<(), Error> {
    println!("Collecting records for users...");
    let seed = read_users(seed_dir.join("u.user"))?;

    let users: Vec<_> = seed
        .iter()
        .map(|user| NewUser {
            id: Some(user.id),
            email: None,
            password: None,
            age: user.age,
            zipcode: user.zipcode.as_deref(),
        })
        .collect();

    println!("Pushing {} users into the database", users.len());
    for chunk in users.chunks(CHUNK_SIZE).progress() {
        insert_into(users::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

fn insert_movies(conn: &PgConnection, seed_dir: &Path) -> Result<(), Error> {
    println!("Collecting records for movies...");
    let seed = read_movies(seed_dir.join("u.item"))?;

    let movies: Vec<_> = seed
        .iter()
        .map(|movie| NewMovie {
            id: Some(movie.id),
            title: &movie.title,
            released_at: movie.released_at,
            imdb_url: movie.imdb_url.as_deref(),
        })
        .collect();

    println!("Pushing {} movies into the database", movies.len());
    for chunk in movies.chunks(CHUNK_SIZE).progress() {
        insert_into(movies::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

fn insert_ratings(conn: &PgConnection, seed_dir: &Path) -> Result<(), Error> {
    println!("Collecting records for ratings...");
    let seed = read_ratings(seed_dir.join("u.data"))?;

    let ratings: Vec<_> = seed
        .iter()
        .map(|rating| NewRating {
            user_id: rating.user_id,
            movie_id: rating.movie_id,
            score: rating.score,
        })
        .collect();

    println!("Pushing ratings by chunks");
    for chunk in ratings.chunks(CHUNK_SIZE).progress() {
        insert_into(ratings::table).values(chunk).execute(conn)?;
    }

    Ok(())
}

// Explicit ids were inserted, move the sequences past them
fn reset_sequences(conn: &PgConnection) -> Result<(), Error> {
    for table in &["users", "movies"] {
        let query = format!(
            "SELECT setval('{table}_id_seq', (SELECT COALESCE(MAX(id), 1) FROM {table}))",
            table = table
        );

        sql_query(query).execute(conn)?;
    }

    Ok(())
}

fn main() -> Result<(), Error> {
    let vars: HashMap<String, String> = dotenv::vars().collect();
    let defaults = Config::default();

    let url = vars
        .get("DATABASE_URL")
        .unwrap_or(&defaults.database.psql_url);
    let seed_dir = vars
        .get("SEED_DIR")
        .unwrap_or(&defaults.database.seed_dir);

    let conn = establish_connection(url)?;
    let seed_dir = Path::new(seed_dir);

    conn.transaction::<_, Error, _>(|| {
        insert_users(&conn, seed_dir)?;
        insert_movies(&conn, seed_dir)?;
        insert_ratings(&conn, seed_dir)?;
        reset_sequences(&conn)
    })?;

    Ok(())
}
