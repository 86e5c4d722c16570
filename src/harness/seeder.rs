use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::HarnessError;

/// Tables and indexes for the models in `schema/benchmark.yaml`.
pub const SCHEMA_DDL: &str = "
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    deleted_at TEXT
);
CREATE TABLE IF NOT EXISTS catalogs (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    type INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS catalog_item (
    id INTEGER PRIMARY KEY,
    catalog_id INTEGER NOT NULL REFERENCES catalogs (id) ON DELETE CASCADE,
    item_id INTEGER NOT NULL REFERENCES items (id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS sub_items (
    id INTEGER PRIMARY KEY,
    item_id INTEGER NOT NULL REFERENCES items (id) ON DELETE CASCADE,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS item_user (
    id INTEGER PRIMARY KEY,
    item_id INTEGER NOT NULL REFERENCES items (id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS user_groups (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    deleted_at TEXT
);
CREATE TABLE IF NOT EXISTS user_user_group (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    user_group_id INTEGER NOT NULL REFERENCES user_groups (id) ON DELETE CASCADE,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_catalog_item_catalog ON catalog_item (catalog_id);
CREATE INDEX IF NOT EXISTS idx_catalog_item_item ON catalog_item (item_id);
CREATE INDEX IF NOT EXISTS idx_sub_items_item ON sub_items (item_id);
CREATE INDEX IF NOT EXISTS idx_item_user_item ON item_user (item_id);
CREATE INDEX IF NOT EXISTS idx_user_user_group_user ON user_user_group (user_id);
";

const DROP_DDL: &str = "
DROP TABLE IF EXISTS user_user_group;
DROP TABLE IF EXISTS user_groups;
DROP TABLE IF EXISTS item_user;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS sub_items;
DROP TABLE IF EXISTS catalog_item;
DROP TABLE IF EXISTS catalogs;
DROP TABLE IF EXISTS items;
";

/// Sub-item names other than the probe.
const WORDS: [&str; 12] = [
    "alias", "beatae", "culpa", "dolores", "eius", "fugit", "illum", "magni", "minus", "odio",
    "quia", "velit",
];

/// Catalog `type` values cycle through 1..=CATALOG_TYPES.
pub const CATALOG_TYPES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedOptions {
    pub catalogs: u32,
    /// Every item is attached to every catalog.
    pub items: u32,
    pub users: u32,
    pub user_groups: u32,
    pub probe_name: String,
    /// Fraction of items whose sub-item carries `probe_name`
    pub probe_ratio: f64,
    /// Fraction of items, user groups and group memberships soft-deleted
    pub soft_delete_ratio: f64,
    pub seed: u64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        SeedOptions {
            catalogs: 100,
            items: 1000,
            users: 10,
            user_groups: 3,
            probe_name: "natus@".to_string(),
            probe_ratio: 0.1,
            soft_delete_ratio: 0.05,
            seed: 42,
        }
    }
}

/// Row counts written by `seed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub items: u64,
    pub deleted_items: u64,
    pub catalogs: u64,
    pub catalog_items: u64,
    pub sub_items: u64,
    pub probe_sub_items: u64,
    pub users: u64,
    pub user_groups: u64,
    pub memberships: u64,
}

pub fn create_schema(conn: &Connection) -> Result<(), HarnessError> {
    conn.execute_batch(SCHEMA_DDL)?;
    Ok(())
}

/// Recreate the schema and fill it deterministically from `options.seed`.
/// Existing benchmark tables are dropped first.
pub fn seed(conn: &mut Connection, options: &SeedOptions) -> Result<SeedSummary, HarnessError> {
    let started = Utc::now();
    log::info!(
        "Seeding {} items x {} catalogs (seed {}) at {}",
        options.items,
        options.catalogs,
        options.seed,
        started.to_rfc3339()
    );

    conn.execute_batch(DROP_DDL)?;
    create_schema(conn)?;
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut summary = SeedSummary::default();
    let deleted_at = started.format("%Y-%m-%d %H:%M:%S").to_string();

    let tx = conn.transaction()?;
    {
        let mut insert_catalog =
            tx.prepare("INSERT INTO catalogs (id, name, type) VALUES (?1, ?2, ?3)")?;
        for id in 1..=options.catalogs {
            let catalog_type = (id - 1) % CATALOG_TYPES + 1;
            insert_catalog.execute(params![id, format!("catalog-{id}"), catalog_type])?;
            summary.catalogs += 1;
        }

        let mut insert_item =
            tx.prepare("INSERT INTO items (id, name, deleted_at) VALUES (?1, ?2, ?3)")?;
        let mut attach_catalog =
            tx.prepare("INSERT INTO catalog_item (catalog_id, item_id) VALUES (?1, ?2)")?;
        let mut insert_sub_item =
            tx.prepare("INSERT INTO sub_items (item_id, name) VALUES (?1, ?2)")?;
        for id in 1..=options.items {
            let deleted = rng.gen_bool(options.soft_delete_ratio);
            insert_item.execute(params![
                id,
                format!("item-{id}"),
                deleted.then_some(deleted_at.as_str())
            ])?;
            summary.items += 1;
            if deleted {
                summary.deleted_items += 1;
            }

            for catalog_id in 1..=options.catalogs {
                attach_catalog.execute(params![catalog_id, id])?;
                summary.catalog_items += 1;
            }

            let name = if rng.gen_bool(options.probe_ratio) {
                summary.probe_sub_items += 1;
                options.probe_name.as_str()
            } else {
                WORDS[rng.gen_range(0..WORDS.len())]
            };
            insert_sub_item.execute(params![id, name])?;
            summary.sub_items += 1;
        }

        let mut insert_user = tx.prepare("INSERT INTO users (id, name) VALUES (?1, ?2)")?;
        let mut attach_item =
            tx.prepare("INSERT INTO item_user (item_id, user_id) VALUES (?1, ?2)")?;
        for id in 1..=options.users {
            insert_user.execute(params![id, format!("user-{id}")])?;
            summary.users += 1;
        }
        if options.users > 0 {
            for item_id in 1..=options.items {
                attach_item.execute(params![item_id, rng.gen_range(1..=options.users)])?;
            }
        }

        let mut insert_group =
            tx.prepare("INSERT INTO user_groups (id, name, deleted_at) VALUES (?1, ?2, ?3)")?;
        let mut attach_user = tx.prepare(
            "INSERT INTO user_user_group (user_id, user_group_id, deleted_at) VALUES (?1, ?2, ?3)",
        )?;
        for id in 1..=options.user_groups {
            let deleted = rng.gen_bool(options.soft_delete_ratio);
            insert_group.execute(params![
                id,
                format!("group-{id}"),
                deleted.then_some(deleted_at.as_str())
            ])?;
            summary.user_groups += 1;
        }
        if options.user_groups > 0 {
            for user_id in 1..=options.users {
                let left = rng.gen_bool(options.soft_delete_ratio);
                attach_user.execute(params![
                    user_id,
                    rng.gen_range(1..=options.user_groups),
                    left.then_some(deleted_at.as_str())
                ])?;
                summary.memberships += 1;
            }
        }
    }
    tx.commit()?;

    log::info!(
        "Seeded {} catalog links, {} probe sub-items in {} ms",
        summary.catalog_items,
        summary.probe_sub_items,
        (Utc::now() - started).num_milliseconds()
    );
    Ok(summary)
}
