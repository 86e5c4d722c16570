use crate::query_builder::{
    FilterItems, GroupByExpressions, Join, JoinItems, JoinType, Literal, Operator,
    OperatorApplication, QueryBuilder, RenderExpr, SelectItems, ToSql,
};

use super::common::{qualified_column, quote_string};

impl ToSql for QueryBuilder {
    fn to_sql(&self) -> String {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select.to_sql(),
            with_alias(&self.from.table, self.from.alias.as_deref())
        );
        sql.push_str(&self.joins.to_sql());
        sql.push_str(&self.filters.to_sql());
        sql.push_str(&self.group_by.to_sql());
        sql
    }
}

impl ToSql for SelectItems {
    fn to_sql(&self) -> String {
        if self.0.is_empty() {
            return "*".to_string();
        }
        self.0
            .iter()
            .map(|expr| expr.to_sql())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ToSql for JoinItems {
    fn to_sql(&self) -> String {
        let mut sql = String::new();
        for join in &self.0 {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }
        sql
    }
}

impl ToSql for Join {
    fn to_sql(&self) -> String {
        let join_type_str = match self.join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        };

        let mut sql = format!(
            "{} {}",
            join_type_str,
            with_alias(&self.table_name, self.table_alias.as_deref())
        );

        // Only add ON clause if there are joining conditions
        if !self.joining_on.is_empty() {
            sql.push_str(" ON ");
            sql.push_str(&and_joined(&self.joining_on));
        }
        sql
    }
}

impl ToSql for FilterItems {
    fn to_sql(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", and_joined(&self.0))
    }
}

impl ToSql for GroupByExpressions {
    fn to_sql(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self.0.iter().map(|e| e.to_sql()).collect();
        format!(" GROUP BY {}", items.join(", "))
    }
}

impl ToSql for OperatorApplication {
    fn to_sql(&self) -> String {
        let rendered: Vec<String> = self.operands.iter().map(|o| o.to_sql()).collect();

        match self.operator {
            Operator::IsNull => format!("{} IS NULL", unary_operand(&rendered)),
            Operator::IsNotNull => format!("{} IS NOT NULL", unary_operand(&rendered)),
            Operator::Exists => format!("EXISTS {}", unary_operand(&rendered)),
            Operator::In => {
                // Subqueries already render with their own parentheses
                let (left, right) = binary_operands(&rendered);
                if matches!(self.operands.get(1), Some(RenderExpr::Subquery(_))) {
                    format!("{} IN {}", left, right)
                } else {
                    format!("{} IN ({})", left, right)
                }
            }
            op => {
                let (left, right) = binary_operands(&rendered);
                format!("{} {} {}", left, operator_symbol(op), right)
            }
        }
    }
}

impl ToSql for RenderExpr {
    fn to_sql(&self) -> String {
        match self {
            RenderExpr::Literal(lit) => lit.to_sql(),
            RenderExpr::Star(None) => "*".to_string(),
            RenderExpr::Star(Some(table)) => format!("{}.*", table.0),
            RenderExpr::Column(column) => column.0.clone(),
            RenderExpr::PropertyAccessExp(pa) => {
                qualified_column(&pa.table_alias.0, &pa.column.0)
            }
            RenderExpr::List(items) => items
                .iter()
                .map(|i| i.to_sql())
                .collect::<Vec<_>>()
                .join(", "),
            RenderExpr::Subquery(query) => format!("({})", query.to_sql()),
        }
    }
}

impl ToSql for Literal {
    fn to_sql(&self) -> String {
        match self {
            Literal::Integer(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Boolean(b) => {
                if *b {
                    "1".into()
                } else {
                    "0".into()
                }
            }
            Literal::String(s) => quote_string(s),
            Literal::Null => "NULL".into(),
        }
    }
}

fn with_alias(table: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("{} AS {}", table, alias),
        None => table.to_string(),
    }
}

fn and_joined(conditions: &[OperatorApplication]) -> String {
    conditions
        .iter()
        .map(|c| c.to_sql())
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn unary_operand(rendered: &[String]) -> &str {
    rendered.first().map(String::as_str).unwrap_or("NULL")
}

fn binary_operands(rendered: &[String]) -> (&str, &str) {
    (
        rendered.first().map(String::as_str).unwrap_or("NULL"),
        rendered.get(1).map(String::as_str).unwrap_or("NULL"),
    )
}

fn operator_symbol(op: Operator) -> &'static str {
    match op {
        Operator::Equal => "=",
        Operator::NotEqual => "<>",
        Operator::LessThan => "<",
        Operator::GreaterThan => ">",
        Operator::LessThanEqual => "<=",
        Operator::GreaterThanEqual => ">=",
        Operator::Like => "LIKE",
        Operator::In => "IN",
        Operator::IsNull => "IS NULL",
        Operator::IsNotNull => "IS NOT NULL",
        Operator::Exists => "EXISTS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::ConditionTargetExt;

    #[test]
    fn test_plain_select() {
        let query = QueryBuilder::new("items");
        assert_eq!(query.to_sql(), "SELECT * FROM items");
    }

    #[test]
    fn test_join_with_compound_condition() {
        let mut query = QueryBuilder::new("items");
        let mut join = Join::new("sub_items", JoinType::Left)
            .on(OperatorApplication::columns_equal("items.id", "sub_items.item_id"));
        join.where_eq("sub_items.name", "x");
        query.join(join);
        query.select(["items.*"]).group_by("items.id");

        assert_eq!(
            query.to_sql(),
            "SELECT items.* FROM items LEFT JOIN sub_items ON items.id = sub_items.item_id \
             AND sub_items.name = 'x' GROUP BY items.id"
        );
    }

    #[test]
    fn test_in_subquery_and_exists() {
        let mut sub = QueryBuilder::new("sub_items");
        sub.select(["sub_items.item_id"]);
        sub.where_eq("sub_items.name", "x");

        let mut exists = QueryBuilder::new("catalogs");
        exists.where_column("catalogs.id", "items.catalog_id");

        let mut query = QueryBuilder::new("items");
        query.where_in_subquery("items.id", sub);
        query.where_exists(exists);

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM items WHERE items.id IN (SELECT sub_items.item_id FROM sub_items \
             WHERE sub_items.name = 'x') AND EXISTS \
             (SELECT * FROM catalogs WHERE catalogs.id = items.catalog_id)"
        );
    }

    #[test]
    fn test_aliased_tables() {
        let mut sub = QueryBuilder::new("sub_items");
        sub.alias_from("sub_items_1");
        sub.where_column("sub_items.item_id", "sub_items_1.item_id");

        let mut query = QueryBuilder::new("items");
        query.join(
            Join::new("items", JoinType::Inner)
                .aliased("items_1")
                .on(OperatorApplication::columns_equal("items.id", "items_1.id")),
        );
        query.where_exists(sub);

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM items INNER JOIN items AS items_1 ON items.id = items_1.id \
             WHERE EXISTS (SELECT * FROM sub_items AS sub_items_1 \
             WHERE sub_items.item_id = sub_items_1.item_id)"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(Literal::from("O'Brien").to_sql(), "'O''Brien'");
        assert_eq!(Literal::from(true).to_sql(), "1");
        assert_eq!(Literal::Null.to_sql(), "NULL");
        assert_eq!(Literal::from(2.5).to_sql(), "2.5");

        let mut query = QueryBuilder::new("catalogs");
        query.where_in_list("catalogs.type", vec![1.into(), 2.into()]);
        query.where_compare("catalogs.type", Operator::NotEqual, 3);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM catalogs WHERE catalogs.type IN (1, 2) AND catalogs.type <> 3"
        );
    }
}
