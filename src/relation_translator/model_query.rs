use super::errors::TranslateError;
use super::exists_translator::ExistsTranslator;
use super::join_translator::JoinTranslator;
use super::path_parser::RelationPath;
use super::subquery_translator::SubqueryTranslator;
use super::RelationTranslator;
use crate::model_catalog::{ModelCatalog, ModelSchema};
use crate::query_builder::{ConditionTarget, OperatorApplication, QueryBuilder};
use crate::sql_generator::generate_sql;

/// A query rooted at one catalog model, the caller-facing entry point to the
/// relation translators.
///
/// ```
/// use relbench::model_catalog::ModelCatalog;
/// use relbench::relation_translator::{ModelQuery, RelationFilter, RelationPath};
///
/// let catalog = ModelCatalog::benchmark().unwrap();
/// let mut items = ModelQuery::new(&catalog, "Item").unwrap();
/// items
///     .where_related_to(
///         RelationPath::new().filtered("catalogs", RelationFilter::equals("catalogs.type", 5)),
///     )
///     .unwrap();
/// assert!(items.to_sql().contains("items.id IN (SELECT catalog_item.item_id"));
/// ```
#[derive(Debug, Clone)]
pub struct ModelQuery<'c> {
    catalog: &'c ModelCatalog,
    model: &'c ModelSchema,
    query: QueryBuilder,
}

impl<'c> ModelQuery<'c> {
    /// A fresh query over `model` with its global scopes applied.
    pub fn new(catalog: &'c ModelCatalog, model: &str) -> Result<Self, TranslateError> {
        let model = catalog.model(model)?;
        Ok(ModelQuery {
            catalog,
            model,
            query: model.new_query(),
        })
    }

    pub fn model(&self) -> &ModelSchema {
        self.model
    }

    /// Traverse `path` with joins. Repeated calls share join deduplication.
    pub fn join_relation(
        &mut self,
        path: impl Into<RelationPath>,
    ) -> Result<&mut Self, TranslateError> {
        self.translate(&JoinTranslator, &path.into())
    }

    /// Traverse `path` with chained `IN (SELECT ...)` filters.
    pub fn where_related_to(
        &mut self,
        path: impl Into<RelationPath>,
    ) -> Result<&mut Self, TranslateError> {
        self.translate(&SubqueryTranslator, &path.into())
    }

    /// Traverse `path` with nested `EXISTS (SELECT ...)` filters.
    pub fn where_has(
        &mut self,
        path: impl Into<RelationPath>,
    ) -> Result<&mut Self, TranslateError> {
        self.translate(&ExistsTranslator, &path.into())
    }

    pub fn translate(
        &mut self,
        translator: &dyn RelationTranslator,
        path: &RelationPath,
    ) -> Result<&mut Self, TranslateError> {
        translator.translate(self.catalog, self.model, &mut self.query, path)?;
        Ok(self)
    }

    /// `SELECT root.* ... GROUP BY root.pk`, collapsing rows multiplied by
    /// one-to-many joins.
    pub fn select_root_distinct(&mut self) -> &mut Self {
        let star = format!("{}.*", self.model.table_name);
        let primary_key = self.model.qualified_primary_key();
        self.query.select([star]);
        self.query.group_by.0.clear();
        self.query.group_by(&primary_key);
        self
    }

    /// Select only the root model's primary key. The harness runs this shape
    /// and reads the ids back from the first column.
    pub fn select_primary_key(&mut self) -> &mut Self {
        let primary_key = self.model.qualified_primary_key();
        self.query.select([primary_key]);
        self
    }

    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    pub fn to_sql(&self) -> String {
        generate_sql(&self.query)
    }
}

impl ConditionTarget for ModelQuery<'_> {
    fn add_condition(&mut self, condition: OperatorApplication) {
        self.query.add_condition(condition);
    }
}
