// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use chrono::NaiveDateTime;
use common_macros::hash_map;
use controller::{Entity, Score};
use std::collections::HashMap;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i32,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

impl User {
    pub fn with_id(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl Entity for User {
    type Id = i32;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        if let Some(email) = &self.email {
            map.insert("email".into(), email.clone());
        }

        if let Some(age) = &self.age {
            map.insert("age".into(), age.to_string());
        }

        if let Some(zipcode) = &self.zipcode {
            map.insert("zipcode".into(), zipcode.clone());
        }

        map
    }
}

impl Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<User id={} email={}>",
            self.id,
            self.email.as_deref().unwrap_or("None")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub released_at: Option<NaiveDateTime>,
    pub imdb_url: Option<String>,
}

impl Movie {
    pub fn with_id(id: i32) -> Self {
        Self {
            id,
            title: format!("Movie #{}", id),
            ..Default::default()
        }
    }
}

impl Entity for Movie {
    type Id = i32;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> HashMap<String, String> {
        let mut map = hash_map! {
            "title".into() => self.title.clone(),
        };

        if let Some(released_at) = &self.released_at {
            map.insert("released_at".into(), released_at.date().to_string());
        }

        if let Some(imdb_url) = &self.imdb_url {
            map.insert("imdb_url".into(), imdb_url.clone());
        }

        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub score: Score,
}

impl Entity for Rating {
    type Id = i32;

    fn get_id(&self) -> Self::Id {
        self.id
    }

    fn get_data(&self) -> HashMap<String, String> {
        hash_map! {
            "user_id".into() => self.user_id.to_string(),
            "movie_id".into() => self.movie_id.to_string(),
            "score".into() => self.score.to_string(),
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Rating id={} movie_id={} user_id={} score={}>",
            self.id, self.movie_id, self.user_id, self.score
        )
    }
}
