// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use serde::Deserialize;
use std::path::Path;

/// Whether the target user may appear as their own neighbor when they already
/// rated the target movie.
#[derive(Debug, Clone, Copy, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SelfPairs {
    Exclude,
    Include,
}

impl Default for SelfPairs {
    fn default() -> Self {
        SelfPairs::Exclude
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub psql_url: String,
    pub seed_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            psql_url: "postgres://postgres:@localhost/ratings".into(),
            seed_dir: "data/seed".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub self_pairs: SelfPairs,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Error> {
        let parsed: Self = toml::from_str(contents)?;
        Ok(parsed)
    }
}
