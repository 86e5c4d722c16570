//! Relation traversal as chained `IN (SELECT ...)` filters.
//!
//! Each hop becomes a filter query over the related model, with the related
//! model's global scopes and the hop's filter applied, reduced to the one key
//! column the parent matches against. Hop N+1 filters hop N's filter query,
//! so a multi-hop path renders as nested subqueries and the root query never
//! gains joins or duplicate rows.

use super::resolver::ResolvedHop;
use super::RelationTranslator;
use crate::model_catalog::{RelationSchema, DELETED_AT_COLUMN};
use crate::query_builder::{
    ConditionTargetExt, Join, JoinType, OperatorApplication, QueryBuilder,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SubqueryTranslator;

impl RelationTranslator for SubqueryTranslator {
    fn name(&self) -> &'static str {
        "subquery"
    }

    fn apply(&self, query: &mut QueryBuilder, hops: &[ResolvedHop<'_>]) {
        // Built innermost first: each filter query absorbs the one after it.
        let mut chained: Option<(String, QueryBuilder)> = None;
        for hop in hops.iter().rev() {
            let (parent_column, mut filter_query) = filter_query(hop);
            if let Some((column, nested)) = chained.take() {
                filter_query.where_in_subquery(&column, nested);
            }
            chained = Some((parent_column, filter_query));
        }

        if let Some((column, filter_query)) = chained {
            query.where_in_subquery(&column, filter_query);
        }
    }
}

/// The hop's filter query and the parent column matched against it.
fn filter_query(hop: &ResolvedHop<'_>) -> (String, QueryBuilder) {
    let mut filter_query = hop.related.new_query();

    let (parent_column, selected) = match hop.relation {
        RelationSchema::BelongsTo(rel) => {
            hop.apply_filter(&mut filter_query, None, None);
            (
                hop.parent.qualified(&rel.foreign_key),
                hop.related.qualified(&rel.owner_key),
            )
        }
        RelationSchema::HasMany(rel) | RelationSchema::HasOne(rel) => {
            hop.apply_filter(&mut filter_query, None, None);
            (
                hop.parent.qualified(&rel.local_key),
                hop.related.qualified(&rel.foreign_key),
            )
        }
        RelationSchema::BelongsToMany(rel) => {
            let mut pivot_join = Join::new(rel.pivot_table.clone(), JoinType::Inner).on(
                OperatorApplication::columns_equal(
                    &rel.qualified_pivot(&rel.related_pivot_key),
                    &hop.related.qualified(&rel.related_key),
                ),
            );
            hop.apply_filter(&mut pivot_join, None, Some(rel.pivot_table.as_str()));
            if hop.pivot_soft_deletes {
                pivot_join.where_null(&rel.qualified_pivot(DELETED_AT_COLUMN));
            }
            filter_query.join(pivot_join);
            (
                hop.parent.qualified(&rel.parent_key),
                rel.qualified_pivot(&rel.foreign_pivot_key),
            )
        }
    };

    filter_query.select([selected]);
    log::debug!(
        "{}.{} -> {} IN (filter on {})",
        hop.parent.name,
        hop.spec.name,
        parent_column,
        hop.related.table_name
    );
    (parent_column, filter_query)
}
