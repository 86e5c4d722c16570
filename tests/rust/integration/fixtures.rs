use relbench::harness::{create_schema, fetch_ids, Strategy};
use relbench::model_catalog::ModelCatalog;
use relbench::relation_translator::{ModelQuery, RelationPath};
use rusqlite::Connection;

/// Items 1-4 (3 soft-deleted), catalogs of type 5, 3 and 5, sub-items named
/// `x`/`y`, users and user groups with soft-deleted memberships.
const FIXTURE: &str = "
INSERT INTO items (id, name, deleted_at) VALUES
    (1, 'item-1', NULL), (2, 'item-2', NULL),
    (3, 'item-3', '2024-01-01 00:00:00'), (4, 'item-4', NULL);
INSERT INTO catalogs (id, name, type) VALUES (1, 'c1', 5), (2, 'c2', 3), (3, 'c3', 5);
INSERT INTO catalog_item (catalog_id, item_id) VALUES (1, 1), (2, 1), (3, 1), (2, 2), (1, 3), (3, 4);
INSERT INTO sub_items (id, item_id, name) VALUES
    (1, 1, 'x'), (2, 1, 'y'), (3, 2, 'y'), (4, 3, 'x'), (5, 4, 'x');
INSERT INTO users (id, name) VALUES (1, 'ann'), (2, 'bob'), (3, 'cy');
INSERT INTO item_user (item_id, user_id) VALUES (1, 1), (2, 2), (4, 3);
INSERT INTO user_groups (id, name, deleted_at) VALUES
    (1, 'g1', NULL), (2, 'g2', NULL), (3, 'g3', '2024-01-01 00:00:00');
INSERT INTO user_user_group (user_id, user_group_id, deleted_at) VALUES
    (1, 1, NULL), (2, 1, '2024-01-01 00:00:00'), (2, 2, '2024-01-01 00:00:00'), (3, 3, NULL);
";

pub fn database() -> Connection {
    let conn = Connection::open_in_memory().expect("sqlite");
    create_schema(&conn).expect("schema");
    conn.execute_batch(FIXTURE).expect("fixture");
    conn
}

pub fn catalog() -> ModelCatalog {
    ModelCatalog::benchmark().expect("benchmark catalog")
}

/// Build the query for `strategy`, run it and return the sorted root ids.
pub fn root_ids(
    conn: &Connection,
    catalog: &ModelCatalog,
    model: &str,
    strategy: Strategy,
    path: RelationPath,
) -> Vec<i64> {
    let mut query = ModelQuery::new(catalog, model).expect("root model");
    match strategy {
        Strategy::Exists => {
            query.where_has(path).expect("where_has");
        }
        Strategy::Subquery => {
            query.where_related_to(path).expect("where_related_to");
        }
        Strategy::Join => {
            query
                .join_relation(path)
                .expect("join_relation")
                .select_root_distinct();
        }
    }
    query.select_primary_key();
    fetch_ids(conn, &query.to_sql()).expect("query runs")
}
