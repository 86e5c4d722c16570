use relbench::model_catalog::ModelCatalog;
use relbench::query_builder::{ConditionTargetExt, Operator, QueryBuilder};
use relbench::relation_translator::{ModelQuery, RelationFilter, RelationPath};
use relbench::sql_generator::generate_sql;

#[test]
fn test_string_literals_are_escaped() {
    let mut query = QueryBuilder::new("sub_items");
    query.where_eq("sub_items.name", "o'brien");
    assert_eq!(
        generate_sql(&query),
        "SELECT * FROM sub_items WHERE sub_items.name = 'o''brien'"
    );
}

#[test]
fn test_comparison_operators() {
    let mut query = QueryBuilder::new("catalogs");
    query.where_compare("catalogs.type", Operator::GreaterThanEqual, 3);
    query.where_compare("catalogs.type", Operator::NotEqual, 7);
    query.where_not_null("catalogs.name");
    assert_eq!(
        generate_sql(&query),
        "SELECT * FROM catalogs WHERE catalogs.type >= 3 AND catalogs.type <> 7 \
         AND catalogs.name IS NOT NULL"
    );
}

#[test]
fn test_where_related_to_matches_framework_shape() {
    let catalog = ModelCatalog::benchmark().expect("catalog");
    let mut query = ModelQuery::new(&catalog, "Item").expect("Item");
    query
        .where_related_to(
            RelationPath::new().filtered("catalogs", RelationFilter::equals("catalogs.type", 1)),
        )
        .and_then(|q| {
            q.where_related_to(
                RelationPath::new()
                    .filtered("subItems", RelationFilter::equals("sub_items.name", "natus@")),
            )
        })
        .expect("translates");

    assert_eq!(
        query.to_sql(),
        "SELECT * FROM items WHERE items.deleted_at IS NULL \
         AND items.id IN (SELECT catalog_item.item_id FROM catalogs INNER JOIN catalog_item \
         ON catalog_item.catalog_id = catalogs.id AND catalogs.type = 1) \
         AND items.id IN (SELECT sub_items.item_id FROM sub_items WHERE sub_items.name = 'natus@')"
    );
}
