use std::time::{Duration, Instant};

use rusqlite::Connection;

use super::report::StrategyTiming;
use super::{HarnessError, Strategy};
use crate::model_catalog::ModelCatalog;
use crate::relation_translator::{ModelQuery, RelationFilter, RelationPath};

const ROOT_MODEL: &str = "Item";

/// Runs the benchmark rounds against a seeded connection.
pub struct BenchRunner<'a> {
    conn: &'a Connection,
    catalog: &'a ModelCatalog,
    probe_name: String,
}

impl<'a> BenchRunner<'a> {
    pub fn new(
        conn: &'a Connection,
        catalog: &'a ModelCatalog,
        probe_name: impl Into<String>,
    ) -> Self {
        BenchRunner {
            conn,
            catalog,
            probe_name: probe_name.into(),
        }
    }

    /// Round `round`'s query: items attached to a catalog of type `round`
    /// with a sub-item named after the probe, one translator call per
    /// relation. Only the root primary key is selected.
    pub fn build_query(
        &self,
        strategy: Strategy,
        round: u32,
    ) -> Result<ModelQuery<'a>, HarnessError> {
        let catalogs = RelationPath::new().filtered(
            "catalogs",
            RelationFilter::equals("catalogs.type", round),
        );
        let sub_items = RelationPath::new().filtered(
            "subItems",
            RelationFilter::equals("sub_items.name", self.probe_name.clone()),
        );

        let mut query = ModelQuery::new(self.catalog, ROOT_MODEL)?;
        match strategy {
            Strategy::Exists => {
                query.where_has(catalogs)?.where_has(sub_items)?;
            }
            Strategy::Subquery => {
                query.where_related_to(catalogs)?.where_related_to(sub_items)?;
            }
            Strategy::Join => {
                query
                    .join_relation(catalogs)?
                    .join_relation(sub_items)?
                    .select_root_distinct();
            }
        }
        query.select_primary_key();
        Ok(query)
    }

    /// Execute one round, returning the matched root ids.
    pub fn run_round(&self, strategy: Strategy, round: u32) -> Result<Vec<i64>, HarnessError> {
        let query = self.build_query(strategy, round)?;
        fetch_ids(self.conn, &query.to_sql())
    }

    /// Rounds 1..=iterations, timed end to end including translation.
    pub fn run(&self, strategy: Strategy, iterations: u32) -> Result<StrategyTiming, HarnessError> {
        let mut total = Duration::ZERO;
        let mut rows = Vec::with_capacity(iterations as usize);

        for round in 1..=iterations {
            let start = Instant::now();
            let ids = self.run_round(strategy, round)?;
            total += start.elapsed();
            log::debug!("{} round {}: {} rows", strategy, round, ids.len());
            rows.push(ids.len());
        }

        let timing = StrategyTiming::new(strategy, total, rows);
        log::info!(
            "{}: {} rounds in {:.3} ms (mean {:.3} ms)",
            strategy,
            iterations,
            timing.total_ms,
            timing.mean_ms
        );
        Ok(timing)
    }

    pub fn run_all(
        &self,
        strategies: &[Strategy],
        iterations: u32,
    ) -> Result<Vec<StrategyTiming>, HarnessError> {
        strategies
            .iter()
            .map(|strategy| self.run(*strategy, iterations))
            .collect()
    }
}

/// Run `sql` and collect the first column as sorted ids.
pub fn fetch_ids(conn: &Connection, sql: &str) -> Result<Vec<i64>, HarnessError> {
    log::trace!("executing: {}", sql);
    let mut stmt = conn.prepare(sql)?;
    let mut ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort_unstable();
    Ok(ids)
}
