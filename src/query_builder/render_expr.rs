use serde::{Deserialize, Serialize};
use std::fmt;

use super::QueryBuilder;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum RenderExpr {
    Literal(Literal),

    /// `*` or `table.*`
    Star(Option<TableAlias>),

    /// Unqualified column name
    Column(Column),

    /// `table.column`
    PropertyAccessExp(PropertyAccess),

    List(Vec<RenderExpr>),

    /// Nested SELECT used as the right side of IN or the operand of EXISTS
    Subquery(Box<QueryBuilder>),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct TableAlias(pub String);

#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct Column(pub String);

#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct PropertyAccess {
    pub table_alias: TableAlias,
    pub column: Column,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    Like,
    In,
    IsNull,
    IsNotNull,
    Exists,
}

/// A single predicate. WHERE clauses and join conditions hold lists of these,
/// combined with AND.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OperatorApplication {
    pub operator: Operator,
    pub operands: Vec<RenderExpr>,
}

impl RenderExpr {
    /// Parse `table.column` into a property access, anything else into a bare column.
    pub fn column(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() => {
                RenderExpr::PropertyAccessExp(PropertyAccess::new(table, column))
            }
            _ => RenderExpr::Column(Column(name.to_string())),
        }
    }

    pub fn qualified(table: &str, column: &str) -> Self {
        RenderExpr::PropertyAccessExp(PropertyAccess::new(table, column))
    }

    pub fn table_star(table: &str) -> Self {
        RenderExpr::Star(Some(TableAlias(table.to_string())))
    }

    /// Point `table.column` references at `alias` instead. Subqueries are
    /// their own scope and are left alone.
    pub fn requalify(&mut self, table: &str, alias: &str) {
        match self {
            RenderExpr::PropertyAccessExp(pa) if pa.table_alias.0 == table => {
                pa.table_alias = TableAlias(alias.to_string());
            }
            RenderExpr::List(items) => {
                for item in items {
                    item.requalify(table, alias);
                }
            }
            _ => {}
        }
    }

    /// The `table.column` form of a column reference, if this is one.
    pub fn column_name(&self) -> Option<String> {
        match self {
            RenderExpr::Column(Column(name)) => Some(name.clone()),
            RenderExpr::PropertyAccessExp(pa) => Some(pa.to_string()),
            _ => None,
        }
    }
}

impl PropertyAccess {
    pub fn new(table: &str, column: &str) -> Self {
        PropertyAccess {
            table_alias: TableAlias(table.to_string()),
            column: Column(column.to_string()),
        }
    }
}

impl fmt::Display for PropertyAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table_alias.0, self.column.0)
    }
}

impl OperatorApplication {
    pub fn new(operator: Operator, operands: Vec<RenderExpr>) -> Self {
        OperatorApplication { operator, operands }
    }

    /// `column <op> value`, the shape of a framework `where('col', '=', value)`.
    pub fn compare(column: &str, operator: Operator, value: impl Into<Literal>) -> Self {
        Self::new(
            operator,
            vec![RenderExpr::column(column), RenderExpr::Literal(value.into())],
        )
    }

    pub fn equals(column: &str, value: impl Into<Literal>) -> Self {
        Self::compare(column, Operator::Equal, value)
    }

    /// `left = right` between two columns, the shape of a join key condition.
    pub fn columns_equal(left: &str, right: &str) -> Self {
        Self::new(
            Operator::Equal,
            vec![RenderExpr::column(left), RenderExpr::column(right)],
        )
    }

    pub fn is_null(column: &str) -> Self {
        Self::new(Operator::IsNull, vec![RenderExpr::column(column)])
    }

    pub fn is_not_null(column: &str) -> Self {
        Self::new(Operator::IsNotNull, vec![RenderExpr::column(column)])
    }

    pub fn in_list(column: &str, values: Vec<Literal>) -> Self {
        Self::new(
            Operator::In,
            vec![
                RenderExpr::column(column),
                RenderExpr::List(values.into_iter().map(RenderExpr::Literal).collect()),
            ],
        )
    }

    pub fn in_subquery(column: &str, subquery: QueryBuilder) -> Self {
        Self::new(
            Operator::In,
            vec![
                RenderExpr::column(column),
                RenderExpr::Subquery(Box::new(subquery)),
            ],
        )
    }

    pub fn exists(subquery: QueryBuilder) -> Self {
        Self::new(
            Operator::Exists,
            vec![RenderExpr::Subquery(Box::new(subquery))],
        )
    }

    pub fn requalify(&mut self, table: &str, alias: &str) {
        for operand in &mut self.operands {
            operand.requalify(table, alias);
        }
    }

    /// True when this is `<column> IS NULL` on exactly the given qualified column.
    pub fn is_null_check_on(&self, qualified_column: &str) -> bool {
        self.operator == Operator::IsNull
            && self.operands.len() == 1
            && self.operands[0].column_name().as_deref() == Some(qualified_column)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(value as i64)
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Literal::Integer(value as i64)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}
