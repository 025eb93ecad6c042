// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::schema::movies;
use chrono::NaiveDateTime;
use common_macros::hash_map;
use controller::Entity;
use std::collections::HashMap;

#[derive(Debug, Clone, Identifiable, Queryable, Default)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub released_at: Option<NaiveDateTime>,
    pub imdb_url: Option<String>,
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

#[derive(Debug, Clone, Insertable)]
#[table_name = "movies"]
pub struct NewMovie<'a> {
    pub id: Option<i32>,
    pub title: &'a str,
    pub released_at: Option<NaiveDateTime>,
    pub imdb_url: Option<&'a str>,
}
