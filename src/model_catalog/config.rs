use super::errors::ModelCatalogError;
use super::model_schema::{
    BelongsToManyRelation, BelongsToRelation, GlobalScope, HasRelation, ModelCatalog,
    ModelSchema, RelationSchema,
};
use super::naming;
use crate::query_builder::{Literal, Operator, OperatorApplication};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Model catalogs are defined in YAML with the following structure:
///
/// ```yaml
/// name: benchmark
/// models:
///   - name: Item
///     soft_deletes: true          # registers `items.deleted_at IS NULL`
///     relations:
///       subItems:
///         kind: has_many
///         related: SubItem        # keys default to `item_id` / `id`
///       catalogs:
///         kind: belongs_to_many
///         related: Catalog        # pivot defaults to `catalog_item`
///         pivot_wheres:
///           - column: deleted_at
///             op: is_null
///   - name: Catalog
///     global_scopes:
///       - name: published
///         conditions:
///           - column: published
///             op: "="
///             value: 1
/// ```
///
/// Omitted table and key names follow the usual ORM conventions (see
/// `naming`). Relation kinds other than `has_many`, `has_one`, `belongs_to`
/// and `belongs_to_many` load fine but fail at translation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalogConfig {
    /// Optional catalog name
    #[serde(default)]
    pub name: Option<String>,
    pub models: Vec<ModelDefinition>,
}

/// Model definition in catalog config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    /// Defaults to the snake-case plural of `name`
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub soft_deletes: bool,
    #[serde(default)]
    pub global_scopes: Vec<ScopeDefinition>,
    /// Keyed by relation name, the name a relation path refers to
    #[serde(default)]
    pub relations: BTreeMap<String, RelationDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeDefinition {
    pub name: String,
    pub conditions: Vec<ConditionDefinition>,
}

/// `column op value`; unqualified columns are qualified with the owning table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDefinition {
    pub column: String,
    #[serde(default = "default_condition_operator")]
    pub op: ConditionOperator,
    #[serde(default)]
    pub value: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=", alias = "<>")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "is_null")]
    IsNull,
    #[serde(rename = "is_not_null")]
    IsNotNull,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// `has_many`, `has_one`, `belongs_to`, `belongs_to_many`, or any other
    /// framework relation kind (kept, but unsupported)
    pub kind: String,
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub local_key: Option<String>,
    #[serde(default)]
    pub owner_key: Option<String>,
    #[serde(default)]
    pub pivot_table: Option<String>,
    #[serde(default)]
    pub foreign_pivot_key: Option<String>,
    #[serde(default)]
    pub related_pivot_key: Option<String>,
    #[serde(default)]
    pub parent_key: Option<String>,
    #[serde(default)]
    pub related_key: Option<String>,
    #[serde(default)]
    pub pivot_wheres: Vec<ConditionDefinition>,
}

const SUPPORTED_KINDS: [&str; 4] = ["has_many", "has_one", "belongs_to", "belongs_to_many"];

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_condition_operator() -> ConditionOperator {
    ConditionOperator::Eq
}

impl ModelCatalogConfig {
    /// Load model catalog configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelCatalogError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ModelCatalogError::ConfigReadError {
                error: e.to_string(),
            })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse model catalog configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ModelCatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| ModelCatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Structural validation of the catalog configuration
    pub fn validate(&self) -> Result<(), ModelCatalogError> {
        if self.models.is_empty() {
            return Err(ModelCatalogError::InvalidConfig {
                message: "Catalog must contain at least one model definition".to_string(),
            });
        }

        let mut seen_names = HashSet::new();
        let mut seen_tables = HashSet::new();
        for model in &self.models {
            if !seen_names.insert(model.name.as_str()) {
                return Err(ModelCatalogError::InvalidConfig {
                    message: format!("Duplicate model name: {}", model.name),
                });
            }
            if !seen_tables.insert(model.table_name()) {
                return Err(ModelCatalogError::InvalidConfig {
                    message: format!(
                        "Duplicate table '{}' (model {})",
                        model.table_name(),
                        model.name
                    ),
                });
            }
        }

        for model in &self.models {
            for scope in &model.global_scopes {
                for condition in &scope.conditions {
                    condition.validate(&format!("scope '{}' on {}", scope.name, model.name))?;
                }
            }

            for (name, relation) in &model.relations {
                if !relation.is_supported() {
                    continue;
                }
                let related = relation.related.as_deref().ok_or_else(|| {
                    ModelCatalogError::InvalidConfig {
                        message: format!(
                            "Relation '{}.{}' ({}) requires a related model",
                            model.name, name, relation.kind
                        ),
                    }
                })?;
                if !seen_names.contains(related) {
                    return Err(ModelCatalogError::InvalidConfig {
                        message: format!(
                            "Relation '{}.{}' points at unknown model '{}'",
                            model.name, name, related
                        ),
                    });
                }
                for condition in &relation.pivot_wheres {
                    condition.validate(&format!("pivot of {}.{}", model.name, name))?;
                }
            }
        }

        Ok(())
    }

    /// Convert to a ModelCatalog, filling in conventional names
    pub fn to_model_catalog(&self) -> Result<ModelCatalog, ModelCatalogError> {
        self.validate()?;

        let primary_keys: HashMap<&str, &str> = self
            .models
            .iter()
            .map(|m| (m.name.as_str(), m.primary_key.as_str()))
            .collect();

        let mut models = Vec::with_capacity(self.models.len());
        for model_def in &self.models {
            let table_name = model_def.table_name();

            let mut global_scopes = Vec::new();
            if model_def.soft_deletes {
                global_scopes.push(GlobalScope::soft_delete(&table_name));
            }
            for scope in &model_def.global_scopes {
                let conditions = scope
                    .conditions
                    .iter()
                    .map(|c| c.to_condition(&table_name))
                    .collect::<Result<Vec<_>, _>>()?;
                global_scopes.push(GlobalScope::new(scope.name.clone(), conditions));
            }

            let mut relations = HashMap::new();
            let mut unsupported_relations = HashMap::new();
            for (name, rel_def) in &model_def.relations {
                if !rel_def.is_supported() {
                    log::debug!(
                        "Relation {}.{} has unsupported kind '{}'; kept for error reporting",
                        model_def.name,
                        name,
                        rel_def.kind
                    );
                    unsupported_relations.insert(name.clone(), rel_def.kind.clone());
                    continue;
                }
                // validate() guarantees `related` is set and known
                let related = rel_def.related.clone().unwrap_or_default();
                let related_pk = primary_keys
                    .get(related.as_str())
                    .copied()
                    .unwrap_or("id")
                    .to_string();

                let relation = match rel_def.kind.as_str() {
                    "has_many" | "has_one" => {
                        let has = HasRelation {
                            foreign_key: rel_def.foreign_key.clone().unwrap_or_else(|| {
                                naming::foreign_key(&model_def.name, &model_def.primary_key)
                            }),
                            local_key: rel_def
                                .local_key
                                .clone()
                                .unwrap_or_else(|| model_def.primary_key.clone()),
                            related,
                        };
                        if rel_def.kind == "has_many" {
                            RelationSchema::HasMany(has)
                        } else {
                            RelationSchema::HasOne(has)
                        }
                    }
                    "belongs_to" => RelationSchema::BelongsTo(BelongsToRelation {
                        foreign_key: rel_def
                            .foreign_key
                            .clone()
                            .unwrap_or_else(|| naming::foreign_key(name, &related_pk)),
                        owner_key: rel_def.owner_key.clone().unwrap_or(related_pk),
                        related,
                    }),
                    _ => {
                        let pivot_table = rel_def
                            .pivot_table
                            .clone()
                            .unwrap_or_else(|| naming::pivot_table(&model_def.name, &related));
                        let pivot_wheres = rel_def
                            .pivot_wheres
                            .iter()
                            .map(|c| c.to_condition(&pivot_table))
                            .collect::<Result<Vec<_>, _>>()?;
                        RelationSchema::BelongsToMany(BelongsToManyRelation {
                            foreign_pivot_key: rel_def.foreign_pivot_key.clone().unwrap_or_else(
                                || naming::foreign_key(&model_def.name, &model_def.primary_key),
                            ),
                            related_pivot_key: rel_def
                                .related_pivot_key
                                .clone()
                                .unwrap_or_else(|| naming::foreign_key(&related, &related_pk)),
                            parent_key: rel_def
                                .parent_key
                                .clone()
                                .unwrap_or_else(|| model_def.primary_key.clone()),
                            related_key: rel_def.related_key.clone().unwrap_or(related_pk),
                            pivot_table,
                            pivot_wheres,
                            related,
                        })
                    }
                };
                relations.insert(name.clone(), relation);
            }

            models.push(ModelSchema {
                name: model_def.name.clone(),
                table_name,
                primary_key: model_def.primary_key.clone(),
                soft_deletes: model_def.soft_deletes,
                global_scopes,
                relations,
                unsupported_relations,
            });
        }

        log::debug!("Loaded model catalog with {} models", models.len());

        Ok(ModelCatalog::new(
            self.name.clone().unwrap_or_else(|| "default".to_string()),
            models,
        ))
    }
}

impl ModelDefinition {
    pub fn table_name(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| naming::table_name(&self.name))
    }
}

impl RelationDefinition {
    pub fn is_supported(&self) -> bool {
        SUPPORTED_KINDS.contains(&self.kind.as_str())
    }
}

impl ConditionDefinition {
    fn validate(&self, context: &str) -> Result<(), ModelCatalogError> {
        let needs_value = !matches!(
            self.op,
            ConditionOperator::IsNull | ConditionOperator::IsNotNull
        );
        if needs_value && self.value.is_none() {
            return Err(ModelCatalogError::InvalidConfig {
                message: format!(
                    "Condition on '{}' in {} requires a value",
                    self.column, context
                ),
            });
        }
        if self.op == ConditionOperator::In
            && !matches!(self.value, Some(serde_yaml::Value::Sequence(_)))
        {
            return Err(ModelCatalogError::InvalidConfig {
                message: format!(
                    "Condition on '{}' in {} uses `in` and requires a list value",
                    self.column, context
                ),
            });
        }
        Ok(())
    }

    /// Build the predicate, qualifying a bare column with `table`.
    pub fn to_condition(&self, table: &str) -> Result<OperatorApplication, ModelCatalogError> {
        let column = if self.column.contains('.') {
            self.column.clone()
        } else {
            format!("{}.{}", table, self.column)
        };

        let operator = match self.op {
            ConditionOperator::IsNull => return Ok(OperatorApplication::is_null(&column)),
            ConditionOperator::IsNotNull => return Ok(OperatorApplication::is_not_null(&column)),
            ConditionOperator::In => {
                let values = match &self.value {
                    Some(serde_yaml::Value::Sequence(items)) => items
                        .iter()
                        .map(yaml_to_literal)
                        .collect::<Result<Vec<_>, _>>()?,
                    _ => {
                        return Err(ModelCatalogError::InvalidConfig {
                            message: format!("`in` condition on '{}' needs a list", column),
                        })
                    }
                };
                return Ok(OperatorApplication::in_list(&column, values));
            }
            ConditionOperator::Eq => Operator::Equal,
            ConditionOperator::NotEq => Operator::NotEqual,
            ConditionOperator::Lt => Operator::LessThan,
            ConditionOperator::LtEq => Operator::LessThanEqual,
            ConditionOperator::Gt => Operator::GreaterThan,
            ConditionOperator::GtEq => Operator::GreaterThanEqual,
            ConditionOperator::Like => Operator::Like,
        };

        let value = match &self.value {
            Some(value) => yaml_to_literal(value)?,
            None => Literal::Null,
        };
        Ok(OperatorApplication::compare(&column, operator, value))
    }
}

fn yaml_to_literal(value: &serde_yaml::Value) -> Result<Literal, ModelCatalogError> {
    match value {
        serde_yaml::Value::Null => Ok(Literal::Null),
        serde_yaml::Value::Bool(b) => Ok(Literal::Boolean(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Literal::Integer(i))
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                Ok(Literal::Float(f))
            } else {
                Err(ModelCatalogError::InvalidConfig {
                    message: format!("Unsupported numeric literal: {}", n),
                })
            }
        }
        serde_yaml::Value::String(s) => Ok(Literal::String(s.clone())),
        other => Err(ModelCatalogError::InvalidConfig {
            message: format!("Unsupported literal in condition: {:?}", other),
        }),
    }
}
