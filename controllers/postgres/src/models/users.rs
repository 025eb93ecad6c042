// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::schema::users;
use controller::Entity;
use std::collections::HashMap;
use std::fmt::{self, Display};

// To query data from the database
#[derive(Debug, Clone, Identifiable, Queryable, Default)]
pub struct User {
    pub id: i32,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
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

// To insert a new user into the database, `id: None` lets the sequence pick it
#[derive(Debug, Clone, Insertable)]
#[table_name = "users"]
pub struct NewUser<'a> {
    pub id: Option<i32>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub age: Option<i32>,
    pub zipcode: Option<&'a str>,
}
