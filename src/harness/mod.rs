//! Benchmark harness: seeds a SQLite database with the benchmark schema, runs
//! each relation-query strategy against it and times the rounds.

pub mod report;
pub mod runner;
pub mod seeder;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model_catalog::ModelCatalogError;
use crate::relation_translator::TranslateError;

pub use report::{BenchReport, StrategyTiming};
pub use runner::{fetch_ids, BenchRunner};
pub use seeder::{create_schema, seed, SeedOptions, SeedSummary};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Translation failed: {0}")]
    Translate(#[from] TranslateError),

    #[error("Model catalog error: {0}")]
    Catalog(#[from] ModelCatalogError),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a relation filter is expressed in SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Strategy {
    /// Nested correlated EXISTS subqueries
    #[serde(rename = "has")]
    #[value(name = "has")]
    Exists,
    /// Chained IN subqueries
    #[serde(rename = "select")]
    #[value(name = "select")]
    Subquery,
    /// Joins, rows collapsed with GROUP BY
    #[serde(rename = "join")]
    #[value(name = "join")]
    Join,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Exists, Strategy::Subquery, Strategy::Join];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exists => "has",
            Strategy::Subquery => "select",
            Strategy::Join => "join",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
