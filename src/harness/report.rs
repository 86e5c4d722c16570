use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::seeder::SeedSummary;
use super::{HarnessError, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTiming {
    pub strategy: Strategy,
    pub iterations: usize,
    pub total_ms: f64,
    pub mean_ms: f64,
    /// Rows returned by each round, in round order
    pub rows: Vec<usize>,
}

impl StrategyTiming {
    pub fn new(strategy: Strategy, total: Duration, rows: Vec<usize>) -> Self {
        let total_ms = total.as_secs_f64() * 1000.0;
        let iterations = rows.len();
        let mean_ms = if iterations == 0 {
            0.0
        } else {
            total_ms / iterations as f64
        };
        StrategyTiming {
            strategy,
            iterations,
            total_ms,
            mean_ms,
            rows,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.rows.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    pub started_at: DateTime<Utc>,
    pub catalog: String,
    pub database: String,
    pub seeded: Option<SeedSummary>,
    pub timings: Vec<StrategyTiming>,
}

impl BenchReport {
    pub fn new(catalog: impl Into<String>, database: impl Into<String>) -> Self {
        BenchReport {
            started_at: Utc::now(),
            catalog: catalog.into(),
            database: database.into(),
            seeded: None,
            timings: Vec::new(),
        }
    }

    pub fn fastest(&self) -> Option<&StrategyTiming> {
        self.timings
            .iter()
            .min_by(|a, b| a.total_ms.total_cmp(&b.total_ms))
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "relbench {} on {} ({})",
            self.catalog,
            self.database,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "{:<8} {:>6} {:>12} {:>10} {:>10}",
            "strategy", "rounds", "total ms", "mean ms", "rows"
        );
        for timing in &self.timings {
            let _ = writeln!(
                out,
                "{:<8} {:>6} {:>12.3} {:>10.3} {:>10}",
                timing.strategy.as_str(),
                timing.iterations,
                timing.total_ms,
                timing.mean_ms,
                timing.total_rows()
            );
        }
        if let Some(fastest) = self.fastest() {
            let _ = writeln!(out, "fastest: {}", fastest.strategy);
        }
        out
    }
}
