//! Common utilities for SQL text generation

/// Quote an identifier (column name, table name) if it contains special characters.
///
/// # Examples
/// ```
/// use relbench::sql_generator::quote_identifier;
/// assert_eq!(quote_identifier("user_id"), "user_id");
/// assert_eq!(quote_identifier("user-name"), "\"user-name\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    if name.contains(' ') || name.contains('-') || name.contains('(') || name.contains(')') {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

/// Format a qualified column reference: table.column_name
pub fn qualified_column(table: &str, column_name: &str) -> String {
    format!("{}.{}", quote_identifier(table), quote_identifier(column_name))
}

/// Render a string literal, doubling embedded single quotes.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
