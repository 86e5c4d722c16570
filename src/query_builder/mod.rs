//! In-memory SELECT statements.
//!
//! A `QueryBuilder` is the value every relation translator rewrites: a FROM
//! table, a select list, joins with their ON conditions, AND-ed WHERE
//! conditions and a GROUP BY list. Rendering to SQL text lives in
//! `sql_generator`.
//!
//! Tables may carry an alias. A query that reaches the same table twice
//! names the second instance `<table>_<n>` and rewrites the columns of its
//! conditions with [`Requalified`].

pub mod render_expr;

use serde::{Deserialize, Serialize};

pub use render_expr::{
    Column, Literal, Operator, OperatorApplication, PropertyAccess, RenderExpr, TableAlias,
};

pub trait ToSql {
    fn to_sql(&self) -> String;
}

/// Anything predicates can be attached to: a query's WHERE clause or a join's
/// ON clause. Filter callbacks and global scopes only ever see this surface.
pub trait ConditionTarget {
    fn add_condition(&mut self, condition: OperatorApplication);
}

/// Framework-style helpers (`where`, `whereNull`, ...) for every condition target.
pub trait ConditionTargetExt: ConditionTarget {
    fn where_compare(&mut self, column: &str, operator: Operator, value: impl Into<Literal>) {
        self.add_condition(OperatorApplication::compare(column, operator, value));
    }

    fn where_eq(&mut self, column: &str, value: impl Into<Literal>) {
        self.add_condition(OperatorApplication::equals(column, value));
    }

    fn where_null(&mut self, column: &str) {
        self.add_condition(OperatorApplication::is_null(column));
    }

    fn where_not_null(&mut self, column: &str) {
        self.add_condition(OperatorApplication::is_not_null(column));
    }

    fn where_in_list(&mut self, column: &str, values: Vec<Literal>) {
        self.add_condition(OperatorApplication::in_list(column, values));
    }

    fn where_column(&mut self, left: &str, right: &str) {
        self.add_condition(OperatorApplication::columns_equal(left, right));
    }
}

impl<T: ConditionTarget + ?Sized> ConditionTargetExt for T {}

/// Forwards conditions to `target` with `table.column` rewritten to
/// `alias.column`.
pub struct Requalified<'t, T: ConditionTarget + ?Sized> {
    target: &'t mut T,
    table: &'t str,
    alias: &'t str,
}

impl<'t, T: ConditionTarget + ?Sized> Requalified<'t, T> {
    pub fn new(target: &'t mut T, table: &'t str, alias: &'t str) -> Self {
        Requalified {
            target,
            table,
            alias,
        }
    }
}

impl<T: ConditionTarget + ?Sized> ConditionTarget for Requalified<'_, T> {
    fn add_condition(&mut self, mut condition: OperatorApplication) {
        condition.requalify(self.table, self.alias);
        self.target.add_condition(condition);
    }
}

/// Alias for the `n`th instance of `table` in one query.
pub fn table_alias(table: &str, n: usize) -> String {
    format!("{}_{}", table, n)
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct QueryBuilder {
    pub from: FromTableItem,
    pub select: SelectItems,
    pub joins: JoinItems,
    pub filters: FilterItems,
    pub group_by: GroupByExpressions,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct FromTableItem {
    pub table: String,
    pub alias: Option<String>,
}

/// Empty means `SELECT *`.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SelectItems(pub Vec<RenderExpr>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct JoinItems(pub Vec<Join>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct FilterItems(pub Vec<OperatorApplication>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct GroupByExpressions(pub Vec<RenderExpr>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Join {
    pub table_name: String,
    pub table_alias: Option<String>,
    pub joining_on: Vec<OperatorApplication>,
    pub join_type: JoinType,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        QueryBuilder {
            from: FromTableItem {
                table: table.into(),
                alias: None,
            },
            ..Default::default()
        }
    }

    pub fn table(&self) -> &str {
        &self.from.table
    }

    /// The name columns of the FROM table are qualified with.
    pub fn reference(&self) -> &str {
        self.from.alias.as_deref().unwrap_or(&self.from.table)
    }

    /// Alias the FROM table, rewriting the conditions already attached to it.
    pub fn alias_from(&mut self, alias: impl Into<String>) -> &mut Self {
        let alias = alias.into();
        let table = self.from.table.clone();
        let conditions = self
            .joins
            .0
            .iter_mut()
            .flat_map(|join| join.joining_on.iter_mut())
            .chain(self.filters.0.iter_mut());
        for condition in conditions {
            condition.requalify(&table, &alias);
        }
        self.from.alias = Some(alias);
        self
    }

    /// Replace the select list.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select.0 = columns
            .into_iter()
            .map(|c| select_expr(c.as_ref()))
            .collect();
        self
    }

    pub fn group_by(&mut self, column: &str) -> &mut Self {
        self.group_by.0.push(RenderExpr::column(column));
        self
    }

    pub fn join(&mut self, join: Join) -> &mut Self {
        self.joins.0.push(join);
        self
    }

    pub fn where_in_subquery(&mut self, column: &str, subquery: QueryBuilder) -> &mut Self {
        self.filters
            .0
            .push(OperatorApplication::in_subquery(column, subquery));
        self
    }

    pub fn where_exists(&mut self, subquery: QueryBuilder) -> &mut Self {
        self.filters.0.push(OperatorApplication::exists(subquery));
        self
    }

    /// Tables joined so far, in join order.
    pub fn joined_tables(&self) -> Vec<&str> {
        self.joins.0.iter().map(|j| j.table_name.as_str()).collect()
    }

    pub fn find_join(&self, table: &str) -> Option<&Join> {
        self.joins.0.iter().find(|j| j.table_name == table)
    }

    pub fn find_join_mut(&mut self, table: &str) -> Option<&mut Join> {
        self.joins.0.iter_mut().find(|j| j.table_name == table)
    }
}

impl ConditionTarget for QueryBuilder {
    fn add_condition(&mut self, condition: OperatorApplication) {
        self.filters.0.push(condition);
    }
}

impl Join {
    pub fn new(table_name: impl Into<String>, join_type: JoinType) -> Self {
        Join {
            table_name: table_name.into(),
            table_alias: None,
            joining_on: Vec::new(),
            join_type,
        }
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = Some(alias.into());
        self
    }

    /// The name columns of the joined table are qualified with.
    pub fn reference(&self) -> &str {
        self.table_alias.as_deref().unwrap_or(&self.table_name)
    }

    pub fn on(mut self, condition: OperatorApplication) -> Self {
        self.joining_on.push(condition);
        self
    }
}

impl ConditionTarget for Join {
    fn add_condition(&mut self, condition: OperatorApplication) {
        self.joining_on.push(condition);
    }
}

fn select_expr(column: &str) -> RenderExpr {
    match column.strip_suffix(".*") {
        Some(table) => RenderExpr::table_star(table),
        None if column == "*" => RenderExpr::Star(None),
        None => RenderExpr::column(column),
    }
}
