// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Readers for the MovieLens 100k files used to seed a ratings database:
//! `u.user` and `u.item` are pipe separated, `u.data` is tab separated.

use crate::{error::ErrorKind, Result, Score};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder};
use std::{fs::File, io::Read, path::Path};

const RELEASE_DATE_FORMAT: &str = "%d-%b-%Y";

#[derive(Debug, Clone, PartialEq)]
pub struct SeedUser {
    pub id: i32,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedMovie {
    pub id: i32,
    pub title: String,
    pub released_at: Option<NaiveDateTime>,
    pub imdb_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedRating {
    pub user_id: i32,
    pub movie_id: i32,
    pub score: Score,
}

pub fn read_users(path: impl AsRef<Path>) -> Result<Vec<SeedUser>> {
    users_from_reader(File::open(path)?)
}

pub fn read_movies(path: impl AsRef<Path>) -> Result<Vec<SeedMovie>> {
    movies_from_reader(File::open(path)?)
}

pub fn read_ratings(path: impl AsRef<Path>) -> Result<Vec<SeedRating>> {
    ratings_from_reader(File::open(path)?)
}

pub fn users_from_reader<R: Read>(reader: R) -> Result<Vec<SeedUser>> {
    let mut users = Vec::new();

    for_each_record(reader, b'|', |line, record| {
        users.push(SeedUser {
            id: parse_field(record, 0, line)?,
            age: optional_field(record, 1).map(|age| parse_str(&age, line)).transpose()?,
            zipcode: optional_field(record, 4),
        });

        Ok(())
    })?;

    Ok(users)
}

pub fn movies_from_reader<R: Read>(reader: R) -> Result<Vec<SeedMovie>> {
    let mut movies = Vec::new();

    for_each_record(reader, b'|', |line, record| {
        let title = optional_field(record, 1)
            .ok_or_else(|| ErrorKind::InvalidSeedRecord(line, "missing title".into()))?;

        let released_at = optional_field(record, 2).and_then(|date| {
            match NaiveDate::parse_from_str(&date, RELEASE_DATE_FORMAT) {
                Ok(date) => Some(date.and_hms(0, 0, 0)),
                Err(e) => {
                    log::warn!("Ignoring release date '{}' at line {}: {}", date, line, e);
                    None
                }
            }
        });

        movies.push(SeedMovie {
            id: parse_field(record, 0, line)?,
            title: strip_year(&title).to_owned(),
            released_at,
            imdb_url: optional_field(record, 4),
        });

        Ok(())
    })?;

    Ok(movies)
}

pub fn ratings_from_reader<R: Read>(reader: R) -> Result<Vec<SeedRating>> {
    let mut ratings = Vec::new();

    for_each_record(reader, b'\t', |line, record| {
        ratings.push(SeedRating {
            user_id: parse_field(record, 0, line)?,
            movie_id: parse_field(record, 1, line)?,
            score: parse_field(record, 2, line)?,
        });

        Ok(())
    })?;

    Ok(ratings)
}

// Titles come as "Toy Story (1995)", the year is already in the release date
fn strip_year(title: &str) -> &str {
    let bytes = title.as_bytes();
    let len = bytes.len();

    let has_year = len > 7
        && bytes[len - 7] == b' '
        && bytes[len - 6] == b'('
        && bytes[len - 1] == b')'
        && bytes[len - 5..len - 1].iter().all(u8::is_ascii_digit);

    if has_year {
        &title[..len - 7]
    } else {
        title
    }
}

fn for_each_record<R, F>(reader: R, delimiter: u8, mut f: F) -> Result<()>
where
    R: Read,
    F: FnMut(u64, &ByteRecord) -> Result<()>,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    for (index, record) in reader.byte_records().enumerate() {
        let record = record?;
        f(index as u64 + 1, &record)?;
    }

    Ok(())
}

// The item file isn't valid UTF-8 (latin-1 titles), decode lossily
fn optional_field(record: &ByteRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(|raw| String::from_utf8_lossy(raw).trim().to_owned())
        .filter(|field| !field.is_empty())
}

fn parse_field<T>(record: &ByteRecord, index: usize, line: u64) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let field = optional_field(record, index).ok_or_else(|| {
        ErrorKind::InvalidSeedRecord(line, format!("missing field #{}", index))
    })?;

    parse_str(&field, line)
}

fn parse_str<T>(field: &str, line: u64) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    field
        .parse()
        .map_err(|e: T::Err| ErrorKind::InvalidSeedRecord(line, format!("'{}': {}", field, e)).into())
}
