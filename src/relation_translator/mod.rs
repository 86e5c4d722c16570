//! Relation path translation.
//!
//! A relation path (`"catalogs.subItems"`, or an ordered list of relation
//! keys with filters) is rewritten onto a query rooted at some model, in one
//! of three shapes:
//!
//! - `JoinTranslator`: INNER/LEFT JOINs, deduplicated per table
//! - `SubqueryTranslator`: chained `key IN (SELECT ...)` predicates
//! - `ExistsTranslator`: nested correlated `EXISTS (SELECT ...)` predicates
//!
//! Every hop is resolved against the `ModelCatalog` before the query is
//! touched, so a path with an unknown or unsupported relation fails without
//! leaving a half-translated query behind.

pub mod errors;
pub mod exists_translator;
pub mod filter;
pub mod join_translator;
pub mod model_query;
pub mod path_parser;
pub mod resolver;
pub mod subquery_translator;

pub use errors::TranslateError;
pub use exists_translator::ExistsTranslator;
pub use filter::RelationFilter;
pub use join_translator::{JoinState, JoinTranslator};
pub use model_query::ModelQuery;
pub use path_parser::{parse_relation_key, JoinMode, PathEntry, RelationPath, RelationSpec};
pub use resolver::{is_soft_delete_pivot, resolve_path, ResolvedHop};
pub use subquery_translator::SubqueryTranslator;

use crate::model_catalog::{ModelCatalog, ModelSchema};
use crate::query_builder::QueryBuilder;

pub trait RelationTranslator {
    fn name(&self) -> &'static str;

    /// Rewrite `query` for hops that already resolved.
    fn apply(&self, query: &mut QueryBuilder, hops: &[ResolvedHop<'_>]);

    /// Parse and resolve `path` from `root`, then rewrite `query` in place.
    /// On error the query is left as it was.
    fn translate(
        &self,
        catalog: &ModelCatalog,
        root: &ModelSchema,
        query: &mut QueryBuilder,
        path: &RelationPath,
    ) -> Result<(), TranslateError> {
        let specs = path.parse();
        let hops = resolve_path(catalog, root, &specs)?;
        log::debug!(
            "{} translation of {} hop(s) from {}",
            self.name(),
            hops.len(),
            root.name
        );
        self.apply(query, &hops);
        Ok(())
    }
}
