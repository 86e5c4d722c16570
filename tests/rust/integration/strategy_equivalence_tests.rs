// Every strategy must select the same root rows for the same relation path.
use relbench::harness::Strategy;
use relbench::relation_translator::{RelationFilter, RelationPath};
use test_case::test_case;

use super::fixtures::{catalog, database, root_ids};

fn path(name: &str) -> RelationPath {
    match name {
        "has_many" => RelationPath::new()
            .filtered("subItems", RelationFilter::equals("sub_items.name", "x")),
        "has_one" => RelationPath::new()
            .filtered("subItem", RelationFilter::equals("sub_items.name", "y")),
        "belongs_to" => RelationPath::new()
            .filtered("item", RelationFilter::equals("items.name", "item-1")),
        "belongs_to_unfiltered" => RelationPath::from("item"),
        "belongs_to_many" => RelationPath::new()
            .filtered("catalogs", RelationFilter::equals("catalogs.type", 3)),
        "belongs_to_many_users" => RelationPath::new()
            .filtered("users", RelationFilter::equals("users.name", "bob")),
        "soft_deleted_pivot" => RelationPath::from("users"),
        "soft_deleted_pivot_inverse" => RelationPath::from("userGroups"),
        "two_hops" => RelationPath::from("users.userGroups"),
        "self_relation" => RelationPath::new()
            .filtered("siblings", RelationFilter::equals("sub_items.name", "x")),
        "back_to_root" => RelationPath::new()
            .relation("subItems")
            .filtered("item", RelationFilter::equals("items.name", "item-1")),
        other => panic!("unknown path {}", other),
    }
}

#[test_case("Item", "has_many", &[1, 4] ; "has many")]
#[test_case("Item", "has_one", &[1, 2] ; "has one")]
#[test_case("SubItem", "belongs_to", &[1, 2] ; "belongs to")]
#[test_case(
    "SubItem", "belongs_to_unfiltered", &[1, 2, 3, 5] ; "belongs to skips soft deleted owner"
)]
#[test_case("Item", "belongs_to_many", &[1, 2] ; "belongs to many")]
#[test_case("Item", "belongs_to_many_users", &[2] ; "belongs to many users")]
#[test_case("UserGroup", "soft_deleted_pivot", &[1] ; "soft deleted pivot rows")]
#[test_case("User", "soft_deleted_pivot_inverse", &[1] ; "soft deleted pivot rows inverse")]
#[test_case("Item", "two_hops", &[1] ; "two hops through pivots")]
#[test_case("SubItem", "self_relation", &[1, 2, 4, 5] ; "self relation")]
#[test_case("Item", "back_to_root", &[1] ; "path back to the root table")]
fn test_strategies_return_identical_roots(model: &str, path_name: &str, expected: &[i64]) {
    let conn = database();
    let catalog = catalog();

    for strategy in Strategy::ALL {
        assert_eq!(
            root_ids(&conn, &catalog, model, strategy, path(path_name)),
            expected,
            "{} strategy on {}.{}",
            strategy,
            model,
            path_name
        );
    }
}

#[test]
fn test_catalog_type_and_sub_item_name_scenario() {
    let conn = database();
    let catalog = catalog();

    for strategy in Strategy::ALL {
        let mut query = relbench::relation_translator::ModelQuery::new(&catalog, "Item")
            .expect("Item");
        let catalogs = RelationPath::new()
            .filtered("catalogs", RelationFilter::equals("catalogs.type", 5));
        let sub_items = RelationPath::new()
            .filtered("subItems", RelationFilter::equals("sub_items.name", "x"));
        match strategy {
            Strategy::Exists => {
                query.where_has(catalogs).and_then(|q| q.where_has(sub_items)).expect("has");
            }
            Strategy::Subquery => {
                query
                    .where_related_to(catalogs)
                    .and_then(|q| q.where_related_to(sub_items))
                    .expect("select");
            }
            Strategy::Join => {
                query
                    .join_relation(catalogs)
                    .and_then(|q| q.join_relation(sub_items))
                    .expect("join")
                    .select_root_distinct();
            }
        }
        query.select_primary_key();

        let ids = relbench::harness::fetch_ids(&conn, &query.to_sql()).expect("runs");
        assert_eq!(ids, vec![1, 4], "{} strategy", strategy);
    }
}

#[test]
fn test_single_path_with_both_filters() {
    let conn = database();
    let catalog = catalog();
    let path = || {
        RelationPath::new()
            .filtered("catalogs", RelationFilter::equals("catalogs.type", 5))
            .relation("items")
            .filtered("subItems", RelationFilter::equals("sub_items.name", "y"))
    };

    // Items sharing a type-5 catalog with a live item that has a `y` sub-item.
    let expected = root_ids(&conn, &catalog, "Item", Strategy::Exists, path());
    assert_eq!(expected, vec![1, 4]);
    assert_eq!(
        root_ids(&conn, &catalog, "Item", Strategy::Subquery, path()),
        expected
    );

    // Both many-to-many hops share one catalog_item join, so `items` is the
    // root row itself and only item 1 has a `y` sub-item of its own.
    assert_eq!(
        root_ids(&conn, &catalog, "Item", Strategy::Join, path()),
        vec![1]
    );
}
