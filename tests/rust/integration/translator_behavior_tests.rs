use relbench::harness::{fetch_ids, Strategy};
use relbench::query_builder::ConditionTargetExt;
use relbench::relation_translator::{ModelQuery, RelationFilter, RelationPath, TranslateError};

use super::fixtures::{catalog, database, root_ids};

#[test]
fn test_left_join_keeps_unmatched_roots() {
    let conn = database();
    let catalog = catalog();
    let filter = || RelationFilter::equals("sub_items.name", "x");

    let inner = root_ids(
        &conn,
        &catalog,
        "Item",
        Strategy::Join,
        RelationPath::new().filtered("subItems", filter()),
    );
    let left = root_ids(
        &conn,
        &catalog,
        "Item",
        Strategy::Join,
        RelationPath::new().filtered("left@subItems", filter()),
    );
    assert_eq!(inner, vec![1, 4]);
    assert_eq!(left, vec![1, 2, 4]);
}

#[test]
fn test_filters_receive_the_pivot_table() {
    let conn = database();
    let catalog = catalog();
    let path = || {
        RelationPath::new().filtered(
            "catalogs",
            RelationFilter::new(|target, pivot| {
                let pivot = pivot.expect("many-to-many hops pass the pivot");
                target.where_eq(&format!("{}.catalog_id", pivot), 2);
            }),
        )
    };

    for strategy in Strategy::ALL {
        assert_eq!(
            root_ids(&conn, &catalog, "Item", strategy, path()),
            vec![1, 2],
            "{} strategy",
            strategy
        );
    }
}

#[test]
fn test_repeated_join_relation_reuses_joins() {
    let catalog = catalog();
    let mut query = ModelQuery::new(&catalog, "Item").expect("Item");
    let by_type = RelationPath::new()
        .filtered("catalogs", RelationFilter::equals("catalogs.type", 5));
    let by_name = RelationPath::new()
        .filtered("catalogs", RelationFilter::equals("catalogs.name", "c1"));
    query
        .join_relation(by_type)
        .and_then(|q| q.join_relation(by_name))
        .expect("translates");

    let sql = query.to_sql();
    assert_eq!(sql.matches("JOIN catalogs ").count(), 1);
    assert_eq!(sql.matches("JOIN catalog_item ").count(), 1);
    assert!(sql.contains("catalogs.type = 5 AND catalogs.name = 'c1'"));

    let conn = database();
    query.select_root_distinct().select_primary_key();
    assert_eq!(fetch_ids(&conn, &query.to_sql()).expect("runs"), vec![1]);
}

#[test]
fn test_unsupported_relation_leaves_query_unchanged() {
    let catalog = catalog();
    for strategy in Strategy::ALL {
        let mut query = ModelQuery::new(&catalog, "Item").expect("Item");
        let before = query.to_sql();
        let result = match strategy {
            Strategy::Exists => query.where_has("subItems.item.images").map(|_| ()),
            Strategy::Subquery => query.where_related_to("subItems.item.images").map(|_| ()),
            Strategy::Join => query.join_relation("subItems.item.images").map(|_| ()),
        };

        assert_eq!(
            result,
            Err(TranslateError::UnsupportedRelationKind {
                model: "Item".to_string(),
                relation: "images".to_string(),
                kind: "morph_many".to_string(),
            })
        );
        assert_eq!(query.to_sql(), before, "{} strategy", strategy);
    }
}

#[test]
fn test_translation_is_deterministic() {
    let catalog = catalog();
    let render = |strategy: Strategy| {
        let mut query = ModelQuery::new(&catalog, "User").expect("User");
        let path = RelationPath::new()
            .filtered("items", RelationFilter::equals("items.name", "item-1"))
            .relation("catalogs");
        match strategy {
            Strategy::Exists => query.where_has(path).map(|_| ()),
            Strategy::Subquery => query.where_related_to(path).map(|_| ()),
            Strategy::Join => query.join_relation(path).map(|_| ()),
        }
        .expect("translates");
        query.to_sql()
    };

    for strategy in Strategy::ALL {
        assert_eq!(render(strategy), render(strategy));
    }
}
