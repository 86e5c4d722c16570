use crate::query_builder::{QueryBuilder, ToSql};

mod common;
mod to_sql_query;

pub use common::{qualified_column, quote_identifier, quote_string};

pub fn generate_sql(query: &QueryBuilder) -> String {
    let sql = query.to_sql();
    log::trace!("generated sql: {}", sql);
    sql
}
