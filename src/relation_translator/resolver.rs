use super::errors::TranslateError;
use super::path_parser::RelationSpec;
use crate::model_catalog::{
    BelongsToManyRelation, ModelCatalog, ModelSchema, RelationSchema, DELETED_AT_COLUMN,
};
use crate::query_builder::{ConditionTarget, Requalified};

/// A relation hop resolved against the catalog, ready to be applied.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedHop<'a> {
    pub spec: &'a RelationSpec,
    pub parent: &'a ModelSchema,
    pub related: &'a ModelSchema,
    pub relation: &'a RelationSchema,
    /// Whether the relation's own query drops soft-deleted pivot rows
    pub pivot_soft_deletes: bool,
}

impl ResolvedHop<'_> {
    /// Apply the hop's filter. With an alias, columns of the related table
    /// are rewritten to it.
    pub fn apply_filter(
        &self,
        target: &mut dyn ConditionTarget,
        alias: Option<&str>,
        pivot_table: Option<&str>,
    ) {
        let Some(filter) = &self.spec.filter else {
            return;
        };
        match alias {
            Some(alias) => filter.apply(
                &mut Requalified::new(target, &self.related.table_name, alias),
                pivot_table,
            ),
            None => filter.apply(target, pivot_table),
        }
    }

    /// Apply the related model's global scopes, aliased like `apply_filter`.
    pub fn apply_related_scopes(&self, target: &mut dyn ConditionTarget, alias: Option<&str>) {
        match alias {
            Some(alias) => self.related.apply_global_scopes(&mut Requalified::new(
                target,
                &self.related.table_name,
                alias,
            )),
            None => self.related.apply_global_scopes(target),
        }
    }
}

/// Resolve every hop of a path, starting at `root`. Each hop resolves
/// against the model the previous hop reached.
pub fn resolve_path<'a>(
    catalog: &'a ModelCatalog,
    root: &'a ModelSchema,
    specs: &'a [RelationSpec],
) -> Result<Vec<ResolvedHop<'a>>, TranslateError> {
    let mut hops = Vec::with_capacity(specs.len());
    let mut current = root;

    for spec in specs {
        let relation = current.relation(&spec.name).ok_or_else(|| {
            match current.unsupported_relations.get(&spec.name) {
                Some(kind) => TranslateError::UnsupportedRelationKind {
                    model: current.name.clone(),
                    relation: spec.name.clone(),
                    kind: kind.clone(),
                },
                None => TranslateError::UnknownRelation {
                    model: current.name.clone(),
                    relation: spec.name.clone(),
                },
            }
        })?;
        let related = catalog.model(relation.related_model())?;

        let pivot_soft_deletes = match relation {
            RelationSchema::BelongsToMany(rel) => is_soft_delete_pivot(rel, related),
            _ => false,
        };

        log::debug!(
            "Resolved {}.{} ({}) -> {}",
            current.name,
            spec.name,
            relation.kind(),
            related.name
        );

        hops.push(ResolvedHop {
            spec,
            parent: current,
            related,
            relation,
            pivot_soft_deletes,
        });
        current = related;
    }

    Ok(hops)
}

/// Inspect the relation's base query for an AND-ed `pivot.deleted_at IS NULL`.
pub fn is_soft_delete_pivot(relation: &BelongsToManyRelation, related: &ModelSchema) -> bool {
    let column = relation.qualified_pivot(DELETED_AT_COLUMN);
    relation
        .base_query(related)
        .filters
        .0
        .iter()
        .any(|condition| condition.is_null_check_on(&column))
}
