use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::errors::ModelCatalogError;
use crate::query_builder::{
    ConditionTarget, Join, JoinType, OperatorApplication, QueryBuilder,
};

/// Column soft-deleting models and pivots stamp on deletion.
pub const DELETED_AT_COLUMN: &str = "deleted_at";

/// Name the soft-delete scope is registered under.
pub const SOFT_DELETE_SCOPE: &str = "soft_deletes";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelSchema {
    pub name: String,
    pub table_name: String,
    pub primary_key: String,
    /// Whether the model's base query excludes rows with `deleted_at` set
    pub soft_deletes: bool,
    /// Applied in registration order; the soft-delete scope, when present, is first
    pub global_scopes: Vec<GlobalScope>,
    pub relations: HashMap<String, RelationSchema>,
    /// Declared relations of a kind the translators cannot express, name -> kind
    pub unsupported_relations: HashMap<String, String>,
}

/// A predicate every query against a model carries.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GlobalScope {
    pub name: String,
    /// Already qualified with the owning model's table
    pub conditions: Vec<OperatorApplication>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum RelationSchema {
    HasMany(HasRelation),
    HasOne(HasRelation),
    BelongsTo(BelongsToRelation),
    BelongsToMany(BelongsToManyRelation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    HasMany,
    HasOne,
    BelongsTo,
    BelongsToMany,
}

/// `parent.local_key = related.foreign_key`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HasRelation {
    pub related: String,
    pub foreign_key: String,
    pub local_key: String,
}

/// `parent.foreign_key = related.owner_key`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BelongsToRelation {
    pub related: String,
    pub foreign_key: String,
    pub owner_key: String,
}

/// `parent.parent_key = pivot.foreign_pivot_key` and
/// `pivot.related_pivot_key = related.related_key`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BelongsToManyRelation {
    pub related: String,
    pub pivot_table: String,
    pub foreign_pivot_key: String,
    pub related_pivot_key: String,
    pub parent_key: String,
    pub related_key: String,
    /// Constraints declared on the relation itself (`wherePivotNull` and friends),
    /// qualified with the pivot table
    pub pivot_wheres: Vec<OperatorApplication>,
}

impl ModelSchema {
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.table_name, column)
    }

    pub fn qualified_primary_key(&self) -> String {
        self.qualified(&self.primary_key)
    }

    /// Apply every global scope, in registration order, to a WHERE or ON clause.
    pub fn apply_global_scopes(&self, target: &mut dyn ConditionTarget) {
        for scope in &self.global_scopes {
            scope.apply(target);
        }
    }

    /// A fresh query over this model with its global scopes in place.
    pub fn new_query(&self) -> QueryBuilder {
        let mut query = QueryBuilder::new(self.table_name.clone());
        self.apply_global_scopes(&mut query);
        query
    }

    pub fn relation(&self, name: &str) -> Option<&RelationSchema> {
        self.relations.get(name)
    }
}

impl GlobalScope {
    pub fn new(name: impl Into<String>, conditions: Vec<OperatorApplication>) -> Self {
        GlobalScope {
            name: name.into(),
            conditions,
        }
    }

    /// `table.deleted_at IS NULL`
    pub fn soft_delete(table: &str) -> Self {
        GlobalScope::new(
            SOFT_DELETE_SCOPE,
            vec![OperatorApplication::is_null(&format!(
                "{}.{}",
                table, DELETED_AT_COLUMN
            ))],
        )
    }

    pub fn apply(&self, target: &mut dyn ConditionTarget) {
        for condition in &self.conditions {
            target.add_condition(condition.clone());
        }
    }
}

impl RelationSchema {
    pub fn kind(&self) -> RelationKind {
        match self {
            RelationSchema::HasMany(_) => RelationKind::HasMany,
            RelationSchema::HasOne(_) => RelationKind::HasOne,
            RelationSchema::BelongsTo(_) => RelationKind::BelongsTo,
            RelationSchema::BelongsToMany(_) => RelationKind::BelongsToMany,
        }
    }

    pub fn related_model(&self) -> &str {
        match self {
            RelationSchema::HasMany(rel) | RelationSchema::HasOne(rel) => &rel.related,
            RelationSchema::BelongsTo(rel) => &rel.related,
            RelationSchema::BelongsToMany(rel) => &rel.related,
        }
    }
}

impl BelongsToManyRelation {
    pub fn qualified_pivot(&self, column: &str) -> String {
        format!("{}.{}", self.pivot_table, column)
    }

    /// The query the relation itself would run against the related model,
    /// without the parent-key constraint: related scopes, the pivot join and
    /// the relation's declared pivot constraints.
    pub fn base_query(&self, related: &ModelSchema) -> QueryBuilder {
        let mut query = related.new_query();
        query.join(
            Join::new(self.pivot_table.clone(), JoinType::Inner).on(
                OperatorApplication::columns_equal(
                    &related.qualified(&self.related_key),
                    &self.qualified_pivot(&self.related_pivot_key),
                ),
            ),
        );
        for condition in &self.pivot_wheres {
            query.add_condition(condition.clone());
        }
        query
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationKind::HasMany => "has_many",
            RelationKind::HasOne => "has_one",
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::BelongsToMany => "belongs_to_many",
        };
        f.write_str(name)
    }
}

/// Every model the translators can see, keyed by model name. Immutable once
/// built, so one catalog can serve any number of concurrent translations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub name: String,
    models: HashMap<String, ModelSchema>,
}

impl ModelCatalog {
    pub fn new(name: impl Into<String>, models: Vec<ModelSchema>) -> Self {
        ModelCatalog {
            name: name.into(),
            models: models.into_iter().map(|m| (m.name.clone(), m)).collect(),
        }
    }

    pub fn model(&self, name: &str) -> Result<&ModelSchema, ModelCatalogError> {
        self.models.get(name).ok_or_else(|| ModelCatalogError::Model {
            model: name.to_string(),
        })
    }

    pub fn model_for_table(&self, table: &str) -> Option<&ModelSchema> {
        self.models.values().find(|m| m.table_name == table)
    }

    /// Model names, sorted.
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
