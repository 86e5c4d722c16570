//! Relation traversal as correlated `EXISTS (SELECT ...)` filters, the shape
//! an ORM's stock `whereHas` produces. For many-to-many hops the subquery is
//! the relation's own base query, pivot join and pivot constraints included.
//! A hop whose table is the one it correlates with (a self relation) reads
//! the related rows through an alias so the correlation still reaches out.

use super::resolver::ResolvedHop;
use super::RelationTranslator;
use crate::model_catalog::RelationSchema;
use crate::query_builder::{table_alias, ConditionTargetExt, QueryBuilder};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExistsTranslator;

/// How one nesting level names its parent and its own table.
struct Level {
    parent_ref: String,
    alias: Option<String>,
}

impl RelationTranslator for ExistsTranslator {
    fn name(&self) -> &'static str {
        "exists"
    }

    fn apply(&self, query: &mut QueryBuilder, hops: &[ResolvedHop<'_>]) {
        let mut parent_ref = query.reference().to_string();
        let mut levels = Vec::with_capacity(hops.len());
        for (depth, hop) in hops.iter().enumerate() {
            let table = &hop.related.table_name;
            let alias = (*table == parent_ref).then(|| table_alias(table, depth + 1));
            let reference = alias.clone().unwrap_or_else(|| table.clone());
            levels.push(Level {
                parent_ref: std::mem::replace(&mut parent_ref, reference),
                alias,
            });
        }

        let mut nested: Option<QueryBuilder> = None;
        for (hop, level) in hops.iter().zip(&levels).rev() {
            let mut exists_query = correlated_query(hop, level);
            if let Some(inner) = nested.take() {
                exists_query.where_exists(inner);
            }
            nested = Some(exists_query);
        }

        if let Some(exists_query) = nested {
            query.where_exists(exists_query);
        }
    }
}

fn correlated_query(hop: &ResolvedHop<'_>, level: &Level) -> QueryBuilder {
    let alias = level.alias.as_deref();
    let related_ref = alias.unwrap_or(&hop.related.table_name);
    let parent_column = |column: &str| format!("{}.{}", level.parent_ref, column);
    let related_column = |column: &str| format!("{}.{}", related_ref, column);

    let mut exists_query = match hop.relation {
        RelationSchema::BelongsToMany(rel) => rel.base_query(hop.related),
        _ => hop.related.new_query(),
    };
    if let Some(alias) = alias {
        exists_query.alias_from(alias);
    }

    let pivot_table = match hop.relation {
        RelationSchema::BelongsTo(rel) => {
            exists_query.where_column(
                &parent_column(&rel.foreign_key),
                &related_column(&rel.owner_key),
            );
            None
        }
        RelationSchema::HasMany(rel) | RelationSchema::HasOne(rel) => {
            exists_query.where_column(
                &parent_column(&rel.local_key),
                &related_column(&rel.foreign_key),
            );
            None
        }
        RelationSchema::BelongsToMany(rel) => {
            exists_query.where_column(
                &parent_column(&rel.parent_key),
                &rel.qualified_pivot(&rel.foreign_pivot_key),
            );
            Some(rel.pivot_table.as_str())
        }
    };

    hop.apply_filter(&mut exists_query, alias, pivot_table);
    exists_query
}
