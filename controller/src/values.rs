// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::{self, Display};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Type {
    String,
    Int32,
    DateTime,
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::String => write!(f, "string"),
            Type::Int32 => write!(f, "integer"),
            Type::DateTime => write!(f, "date, {}", DATE_FORMAT),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Field<'a> {
    Required(&'a str, Type),
    Optional(&'a str, Type),
}

impl<'a> Field<'a> {
    pub fn is_optional(&self) -> bool {
        matches!(self, Field::Optional(..))
    }

    pub fn into_tuple(self) -> (&'a str, Type) {
        match self {
            Field::Required(name, ty) | Field::Optional(name, ty) => (name, ty),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int32(i32),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn from_str(value: &str, tp: Type) -> Result<Self, ErrorKind> {
        let value = match tp {
            Type::String => Self::String(value.to_owned()),

            Type::Int32 => {
                let value: i32 = value
                    .parse()
                    .map_err(|e: <i32 as FromStr>::Err| ErrorKind::ValueConvert(e.to_string()))?;
                Self::Int32(value)
            }

            Type::DateTime => {
                let value = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
                    .or_else(|_| {
                        NaiveDate::parse_from_str(value, DATE_FORMAT)
                            .map(|date| date.and_hms(0, 0, 0))
                    })
                    .map_err(|e| ErrorKind::ValueConvert(e.to_string()))?;
                Self::DateTime(value)
            }
        };

        Ok(value)
    }

    pub fn as_string(&self) -> Result<&str, ErrorKind> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(ErrorKind::CastingValue("String")),
        }
    }

    pub fn as_i32(&self) -> Result<i32, ErrorKind> {
        match self {
            Self::Int32(v) => Ok(*v),
            _ => Err(ErrorKind::CastingValue("i32")),
        }
    }

    pub fn as_date_time(&self) -> Result<NaiveDateTime, ErrorKind> {
        match self {
            Self::DateTime(v) => Ok(*v),
            _ => Err(ErrorKind::CastingValue("NaiveDateTime")),
        }
    }
}
