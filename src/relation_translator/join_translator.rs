//! Relation traversal as SQL joins.
//!
//! Every hop joins the related table (and, for many-to-many, the pivot
//! first) with the hop's filter and the related model's global scopes inside
//! the ON clause. A table is joined at most once per query: a later hop that
//! lands on an already joined table adds its filter to the existing join.
//! A hop back to the FROM table joins it once more under an alias.
//! One-to-many joins multiply root rows, so callers deduplicate with
//! `SELECT root.*` and `GROUP BY root.pk`.

use std::collections::HashMap;

use super::path_parser::JoinMode;
use super::resolver::ResolvedHop;
use super::RelationTranslator;
use crate::model_catalog::{BelongsToManyRelation, RelationSchema, DELETED_AT_COLUMN};
use crate::query_builder::{
    table_alias, ConditionTargetExt, Join, JoinType, OperatorApplication, QueryBuilder,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JoinTranslator;

/// Tables joined into a query so far, with their position in the join list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinState {
    from: String,
    joined: HashMap<String, usize>,
}

impl JoinState {
    /// Seed from the FROM table and the joins a query already carries.
    pub fn from_query(query: &QueryBuilder) -> Self {
        let mut state = JoinState {
            from: query.table().to_string(),
            joined: HashMap::new(),
        };
        for (index, join) in query.joins.0.iter().enumerate() {
            state.joined.entry(join.table_name.clone()).or_insert(index);
        }
        state
    }

    pub fn contains(&self, table: &str) -> bool {
        self.joined.contains_key(table)
    }

    pub fn index_of(&self, table: &str) -> Option<usize> {
        self.joined.get(table).copied()
    }

    pub fn len(&self) -> usize {
        self.joined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joined.is_empty()
    }

    /// The alias a new join of `table` needs, if the FROM table already
    /// answers to that name.
    fn alias_for(&self, query: &QueryBuilder, table: &str) -> Option<String> {
        (table == self.from).then(|| table_alias(table, query.joins.0.len() + 1))
    }

    /// Append `join` to `query` and remember its table.
    fn push(&mut self, query: &mut QueryBuilder, join: Join) {
        self.joined
            .insert(join.table_name.clone(), query.joins.0.len());
        query.join(join);
    }

    fn existing<'q>(&self, query: &'q mut QueryBuilder, table: &str) -> Option<&'q mut Join> {
        if self.contains(table) {
            query.find_join_mut(table)
        } else {
            None
        }
    }
}

impl From<JoinMode> for JoinType {
    fn from(mode: JoinMode) -> Self {
        match mode {
            JoinMode::Inner => JoinType::Inner,
            JoinMode::Left => JoinType::Left,
        }
    }
}

impl RelationTranslator for JoinTranslator {
    fn name(&self) -> &'static str {
        "join"
    }

    fn apply(&self, query: &mut QueryBuilder, hops: &[ResolvedHop<'_>]) {
        let mut state = JoinState::from_query(query);
        let mut parent_ref = query.reference().to_string();

        for hop in hops {
            let join_type = JoinType::from(hop.spec.join_mode);
            parent_ref = match hop.relation {
                RelationSchema::HasMany(rel) | RelationSchema::HasOne(rel) => {
                    let keys = (rel.local_key.as_str(), rel.foreign_key.as_str());
                    join_related(query, &mut state, hop, &parent_ref, join_type, keys)
                }
                RelationSchema::BelongsTo(rel) => {
                    let keys = (rel.foreign_key.as_str(), rel.owner_key.as_str());
                    join_related(query, &mut state, hop, &parent_ref, join_type, keys)
                }
                RelationSchema::BelongsToMany(rel) => {
                    join_through_pivot(query, &mut state, hop, &parent_ref, rel, join_type)
                }
            };
        }
    }
}

/// Single-join relations: has-many, has-one and belongs-to. `keys` are the
/// parent-side and related-side key columns. Returns the name the related
/// table is referenced by.
fn join_related(
    query: &mut QueryBuilder,
    state: &mut JoinState,
    hop: &ResolvedHop<'_>,
    parent_ref: &str,
    join_type: JoinType,
    (parent_key, related_key): (&str, &str),
) -> String {
    let table = &hop.related.table_name;

    if let Some(existing) = state.existing(query, table) {
        log::debug!("{} already joined; adding filter to its ON clause", table);
        let alias = existing.table_alias.clone();
        hop.apply_filter(&mut *existing, alias.as_deref(), None);
        return existing.reference().to_string();
    }

    let alias = state.alias_for(query, table);
    let related_ref = alias.clone().unwrap_or_else(|| table.clone());
    let mut join = Join::new(table.clone(), join_type).on(OperatorApplication::columns_equal(
        &format!("{}.{}", parent_ref, parent_key),
        &format!("{}.{}", related_ref, related_key),
    ));
    if let Some(alias) = &alias {
        join = join.aliased(alias.clone());
    }
    hop.apply_filter(&mut join, alias.as_deref(), None);
    hop.apply_related_scopes(&mut join, alias.as_deref());
    state.push(query, join);
    related_ref
}

/// Pivot join then related join. Either is skipped when its table is already
/// joined; a skipped related join still receives the hop's filter.
fn join_through_pivot(
    query: &mut QueryBuilder,
    state: &mut JoinState,
    hop: &ResolvedHop<'_>,
    parent_ref: &str,
    rel: &BelongsToManyRelation,
    join_type: JoinType,
) -> String {
    let pivot = &rel.pivot_table;

    if state.contains(pivot) {
        log::debug!("pivot {} already joined", pivot);
    } else {
        let mut join = Join::new(pivot.clone(), join_type).on(
            OperatorApplication::columns_equal(
                &rel.qualified_pivot(&rel.foreign_pivot_key),
                &format!("{}.{}", parent_ref, rel.parent_key),
            ),
        );
        if hop.pivot_soft_deletes {
            join.where_null(&rel.qualified_pivot(DELETED_AT_COLUMN));
        }
        state.push(query, join);
    }

    let table = &hop.related.table_name;
    if let Some(existing) = state.existing(query, table) {
        log::debug!("{} already joined; adding filter to its ON clause", table);
        let alias = existing.table_alias.clone();
        hop.apply_filter(&mut *existing, alias.as_deref(), Some(pivot.as_str()));
        return existing.reference().to_string();
    }

    let alias = state.alias_for(query, table);
    let related_ref = alias.clone().unwrap_or_else(|| table.clone());
    let mut join = Join::new(table.clone(), join_type).on(OperatorApplication::columns_equal(
        &format!("{}.{}", related_ref, rel.related_key),
        &rel.qualified_pivot(&rel.related_pivot_key),
    ));
    if let Some(alias) = &alias {
        join = join.aliased(alias.clone());
    }
    hop.apply_filter(&mut join, alias.as_deref(), Some(pivot.as_str()));
    hop.apply_related_scopes(&mut join, alias.as_deref());
    state.push(query, join);
    related_ref
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_catalog::ModelCatalog;
    use crate::query_builder::ToSql;
    use crate::relation_translator::{RelationFilter, RelationPath, TranslateError};

    fn translate(
        catalog: &ModelCatalog,
        query: &mut QueryBuilder,
        path: RelationPath,
    ) -> Result<(), TranslateError> {
        let root = catalog.model("Item").expect("Item");
        JoinTranslator.translate(catalog, root, query, &path)
    }

    #[test]
    fn test_belongs_to_join_carries_filter_and_scopes() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let mut query = catalog.model("SubItem").expect("SubItem").new_query();
        let root = catalog.model("SubItem").expect("SubItem");
        JoinTranslator
            .translate(
                &catalog,
                root,
                &mut query,
                &RelationPath::new().filtered("item", RelationFilter::equals("items.name", "a")),
            )
            .expect("translates");

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM sub_items INNER JOIN items ON sub_items.item_id = items.id \
             AND items.name = 'a' AND items.deleted_at IS NULL"
        );
    }

    #[test]
    fn test_belongs_to_many_joins_pivot_then_related() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let mut query = QueryBuilder::new("items");
        translate(
            &catalog,
            &mut query,
            RelationPath::new()
                .filtered("left@catalogs", RelationFilter::equals("catalogs.type", 5)),
        )
        .expect("translates");

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM items \
             LEFT JOIN catalog_item ON catalog_item.item_id = items.id \
             LEFT JOIN catalogs ON catalogs.id = catalog_item.catalog_id AND catalogs.type = 5"
        );
    }

    #[test]
    fn test_soft_deleted_pivot_rows_are_excluded() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let root = catalog.model("UserGroup").expect("UserGroup");
        let mut query = QueryBuilder::new("user_groups");
        JoinTranslator
            .translate(&catalog, root, &mut query, &RelationPath::from("users"))
            .expect("translates");

        let pivot = query.find_join("user_user_group").expect("pivot joined");
        assert!(pivot
            .joining_on
            .iter()
            .any(|c| c.is_null_check_on("user_user_group.deleted_at")));
    }

    #[test]
    fn test_same_table_is_joined_once() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let mut query = QueryBuilder::new("items");
        translate(
            &catalog,
            &mut query,
            RelationPath::new()
                .filtered("subItems", RelationFilter::equals("sub_items.name", "x"))
                .filtered("siblings", RelationFilter::equals("sub_items.id", 3)),
        )
        .expect("translates");

        assert_eq!(query.joined_tables(), vec!["sub_items"]);
        let join = query.find_join("sub_items").expect("joined");
        assert_eq!(
            join.joining_on,
            vec![
                OperatorApplication::columns_equal("items.id", "sub_items.item_id"),
                OperatorApplication::equals("sub_items.name", "x"),
                OperatorApplication::equals("sub_items.id", 3),
            ]
        );
    }

    #[test]
    fn test_hop_back_to_root_table_is_aliased() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let mut query = catalog.model("Item").expect("Item").new_query();
        translate(
            &catalog,
            &mut query,
            RelationPath::new()
                .relation("subItems")
                .filtered("item", RelationFilter::equals("items.name", "item-1")),
        )
        .expect("translates");

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM items \
             INNER JOIN sub_items ON items.id = sub_items.item_id \
             INNER JOIN items AS items_2 ON sub_items.item_id = items_2.id \
             AND items_2.name = 'item-1' AND items_2.deleted_at IS NULL \
             WHERE items.deleted_at IS NULL"
        );

        // A second trip back reuses the aliased join.
        translate(
            &catalog,
            &mut query,
            RelationPath::new()
                .relation("subItems")
                .filtered("item", RelationFilter::equals("items.id", 1)),
        )
        .expect("translates");
        assert_eq!(query.joined_tables(), vec!["sub_items", "items"]);
        assert!(query
            .to_sql()
            .contains("AND items_2.deleted_at IS NULL AND items_2.id = 1"));
    }

    #[test]
    fn test_self_relation_from_root_is_aliased() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let root = catalog.model("SubItem").expect("SubItem");
        let mut query = root.new_query();
        JoinTranslator
            .translate(
                &catalog,
                root,
                &mut query,
                &RelationPath::new()
                    .filtered("siblings", RelationFilter::equals("sub_items.name", "x"))
                    .relation("item"),
            )
            .expect("translates");

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM sub_items \
             INNER JOIN sub_items AS sub_items_1 ON sub_items.item_id = sub_items_1.item_id \
             AND sub_items_1.name = 'x' \
             INNER JOIN items ON sub_items_1.item_id = items.id AND items.deleted_at IS NULL"
        );
    }

    #[test]
    fn test_consecutive_calls_share_join_state() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let mut query = QueryBuilder::new("items");
        translate(&catalog, &mut query, RelationPath::from("catalogs")).expect("first");
        translate(
            &catalog,
            &mut query,
            RelationPath::new().filtered("catalogs", RelationFilter::equals("catalogs.type", 2)),
        )
        .expect("second");

        assert_eq!(query.joined_tables(), vec!["catalog_item", "catalogs"]);
        let catalogs = query.find_join("catalogs").expect("joined");
        assert_eq!(catalogs.joining_on.len(), 2);
        assert_eq!(JoinState::from_query(&query).len(), 2);
    }

    #[test]
    fn test_failed_resolution_leaves_query_untouched() {
        let catalog = ModelCatalog::benchmark().expect("catalog");
        let mut query = QueryBuilder::new("items");
        let before = query.clone();
        let err = translate(&catalog, &mut query, RelationPath::from("catalogs.images"))
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnknownRelation { .. }));
        assert_eq!(query, before);

        let err = translate(&catalog, &mut query, RelationPath::from("subItems.images"))
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnknownRelation { .. }));

        let err = translate(&catalog, &mut query, RelationPath::from("subItems.item.images"))
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedRelationKind { .. }));
        assert_eq!(query, before);
    }
}
