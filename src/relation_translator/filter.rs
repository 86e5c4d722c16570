use std::fmt;
use std::sync::Arc;

use crate::query_builder::{ConditionTarget, ConditionTargetExt, Literal, Operator};

type FilterFn = dyn Fn(&mut dyn ConditionTarget, Option<&str>) + Send + Sync;

/// Caller-supplied predicate builder for one relation hop.
///
/// The callback receives the clause the hop's conditions belong to (a join's
/// ON clause or a filter subquery's WHERE) and, for many-to-many hops, the
/// pivot table name so it can constrain pivot columns.
#[derive(Clone)]
pub struct RelationFilter(Arc<FilterFn>);

impl RelationFilter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn ConditionTarget, Option<&str>) + Send + Sync + 'static,
    {
        RelationFilter(Arc::new(f))
    }

    /// A filter that does not care about the pivot table.
    pub fn conditions<F>(f: F) -> Self
    where
        F: Fn(&mut dyn ConditionTarget) + Send + Sync + 'static,
    {
        RelationFilter(Arc::new(
            move |target: &mut dyn ConditionTarget, _: Option<&str>| f(target),
        ))
    }

    /// `column <op> value`
    pub fn compare(
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Literal>,
    ) -> Self {
        let column = column.into();
        let value = value.into();
        Self::conditions(move |target| target.where_compare(&column, operator, value.clone()))
    }

    pub fn equals(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::compare(column, Operator::Equal, value)
    }

    pub fn apply(&self, target: &mut dyn ConditionTarget, pivot_table: Option<&str>) {
        (self.0)(target, pivot_table)
    }
}

impl fmt::Debug for RelationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RelationFilter(..)")
    }
}
