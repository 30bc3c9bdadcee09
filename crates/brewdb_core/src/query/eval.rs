//! Predicate evaluation.

use crate::query::filter::{Clause, Cond, Expr, Filter, FilterKind};
use brewdb_codec::{Record, Value};
use std::cmp::Ordering;

impl Filter {
    /// Decides whether a record matches this filter.
    ///
    /// Pure: no side effects, never mutates the record, never fails.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match &self.kind {
            FilterKind::Expr(expr) => eval_expr(expr, record),
            FilterKind::Custom(predicate) => predicate(record),
        }
    }
}

fn eval_expr(expr: &Expr, record: &Record) -> bool {
    expr.clauses.iter().all(|clause| eval_clause(clause, record))
}

fn eval_clause(clause: &Clause, record: &Record) -> bool {
    match clause {
        Clause::Or(alternatives) => alternatives.iter().any(|expr| eval_expr(expr, record)),
        Clause::Field { field, conds } => match record.get(field) {
            Some(value) => conds.iter().all(|cond| eval_cond(cond, value)),
            // Absence satisfies only `$exists: false` and `$ne`.
            None => conds
                .iter()
                .all(|cond| matches!(cond, Cond::Exists(false) | Cond::Ne(_))),
        },
    }
}

fn eval_cond(cond: &Cond, value: &Value) -> bool {
    match cond {
        Cond::Eq(operand) => value == operand,
        Cond::Ne(operand) => value != operand,
        Cond::Gt(operand) => compare(value, operand) == Some(Ordering::Greater),
        Cond::Gte(operand) => matches!(
            compare(value, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Cond::Lt(operand) => compare(value, operand) == Some(Ordering::Less),
        Cond::Lte(operand) => matches!(
            compare(value, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Cond::Between(lo, hi) => {
            matches!(compare(value, lo), Some(Ordering::Greater | Ordering::Equal))
                && matches!(compare(value, hi), Some(Ordering::Less | Ordering::Equal))
        }
        Cond::In(items) => items.iter().any(|item| item == value),
        Cond::Nin(items) => !items.iter().any(|item| item == value),
        Cond::Contains(needle) => value
            .as_text()
            .is_some_and(|text| text.to_lowercase().contains(needle)),
        Cond::StartsWith(prefix) => value.as_text().is_some_and(|text| text.starts_with(prefix)),
        Cond::EndsWith(suffix) => value.as_text().is_some_and(|text| text.ends_with(suffix)),
        Cond::Matches(regex) | Cond::Wildcard(regex) => regex.is_match(&value.to_query_string()),
        Cond::Exists(expected) => *expected,
    }
}

/// Ordinal comparison for the range operators.
///
/// Numbers compare numerically and strings lexicographically; any other
/// pairing is incomparable, which excludes the record rather than erroring.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
