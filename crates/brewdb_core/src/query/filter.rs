//! Filter AST and parsing.

use crate::error::{CoreError, CoreResult};
use brewdb_codec::{Record, Value};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::sync::Arc;

const VALID_OPERATORS: &str = "$eq, $ne, $gt, $gte, $lt, $lte, $in, $nin, \
     $like, $regex, $contains, $startswith, $endswith, $between, $exists";

/// A parsed, validated record predicate.
///
/// Built either from a filter expression ([`Filter::parse`]) or from an
/// arbitrary function ([`Filter::from_fn`]). A custom function replaces the
/// whole matching step; it does not compose with operator clauses.
///
/// Matching is pure: it never mutates the record and never fails. Anything
/// that can go wrong (an unknown operator, a malformed regex, an operand of
/// the wrong shape) is rejected by `parse` before any scan begins.
#[derive(Clone)]
pub struct Filter {
    pub(crate) kind: FilterKind,
}

#[derive(Clone)]
pub(crate) enum FilterKind {
    Expr(Expr),
    Custom(Arc<dyn Fn(&Record) -> bool + Send + Sync>),
}

/// An AND-combined list of clauses.
#[derive(Debug, Clone)]
pub(crate) struct Expr {
    pub(crate) clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
pub(crate) enum Clause {
    /// All conditions must hold for the named field.
    Field {
        field: String,
        conds: Vec<Cond>,
    },
    /// At least one nested filter must match.
    Or(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub(crate) enum Cond {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Between(Value, Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    /// Operand pre-lowercased; the test is case-insensitive.
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Matches(Regex),
    Wildcard(Regex),
    Exists(bool),
}

impl Filter {
    /// Parses a filter expression.
    ///
    /// The expression is a map from field name to a literal (equality, or a
    /// wildcard pattern if the literal is a string containing `*`/`?`), an
    /// operator object, or the reserved key `$or` mapping to a list of
    /// nested filters. Sibling keys are AND-combined.
    ///
    /// # Errors
    ///
    /// Returns `Query` for a non-object expression, an unknown operator, a
    /// malformed regex, or an operand of the wrong shape.
    pub fn parse(expr: &Value) -> CoreResult<Self> {
        let Value::Map(pairs) = expr else {
            return Err(CoreError::query(format!(
                "filter must be an object, got {}",
                expr.type_name()
            )));
        };
        Ok(Self {
            kind: FilterKind::Expr(parse_expr(pairs)?),
        })
    }

    /// Wraps a custom predicate function.
    ///
    /// The function receives each raw record and its boolean result is used
    /// directly; none of the operator semantics apply.
    pub fn from_fn(predicate: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        Self {
            kind: FilterKind::Custom(Arc::new(predicate)),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterKind::Expr(expr) => f.debug_tuple("Filter").field(expr).finish(),
            FilterKind::Custom(_) => f.debug_tuple("Filter").field(&"<custom>").finish(),
        }
    }
}

fn parse_expr(pairs: &[(String, Value)]) -> CoreResult<Expr> {
    let mut clauses = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        if key == "$or" {
            clauses.push(parse_or(value)?);
        } else if key.starts_with('$') {
            return Err(unknown_operator(key));
        } else {
            clauses.push(Clause::Field {
                field: key.clone(),
                conds: parse_conds(value)?,
            });
        }
    }
    Ok(Expr { clauses })
}

fn parse_or(operand: &Value) -> CoreResult<Clause> {
    let Value::Array(items) = operand else {
        return Err(CoreError::query("$or requires an array of filters"));
    };
    let mut alternatives = Vec::with_capacity(items.len());
    for item in items {
        let Value::Map(pairs) = item else {
            return Err(CoreError::query("$or entries must be filter objects"));
        };
        alternatives.push(parse_expr(pairs)?);
    }
    Ok(Clause::Or(alternatives))
}

fn parse_conds(condition: &Value) -> CoreResult<Vec<Cond>> {
    match condition {
        // An object literal is always an operator object; its keys are
        // AND-combined tests on the same field.
        Value::Map(pairs) => pairs
            .iter()
            .map(|(op, operand)| parse_operator(op, operand))
            .collect(),
        Value::Text(s) if s.contains('*') || s.contains('?') => {
            Ok(vec![Cond::Wildcard(compile_wildcard(s)?)])
        }
        literal => Ok(vec![Cond::Eq(literal.clone())]),
    }
}

fn parse_operator(op: &str, operand: &Value) -> CoreResult<Cond> {
    match op {
        "$eq" => Ok(Cond::Eq(operand.clone())),
        "$ne" => Ok(Cond::Ne(operand.clone())),
        "$gt" => Ok(Cond::Gt(operand.clone())),
        "$gte" => Ok(Cond::Gte(operand.clone())),
        "$lt" => Ok(Cond::Lt(operand.clone())),
        "$lte" => Ok(Cond::Lte(operand.clone())),
        "$between" => match operand.as_array() {
            Some([lo, hi]) => Ok(Cond::Between(lo.clone(), hi.clone())),
            _ => Err(CoreError::query(
                "$between requires an array of exactly 2 values",
            )),
        },
        "$in" => match operand.as_array() {
            Some(items) => Ok(Cond::In(items.to_vec())),
            None => Err(CoreError::query("$in requires an array of values")),
        },
        "$nin" => match operand.as_array() {
            Some(items) => Ok(Cond::Nin(items.to_vec())),
            None => Err(CoreError::query("$nin requires an array of values")),
        },
        "$contains" => Ok(Cond::Contains(string_operand(op, operand)?.to_lowercase())),
        "$startswith" => Ok(Cond::StartsWith(string_operand(op, operand)?.to_string())),
        "$endswith" => Ok(Cond::EndsWith(string_operand(op, operand)?.to_string())),
        "$regex" => {
            let pattern = string_operand(op, operand)?;
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|err| {
                    CoreError::query(format!("invalid regex pattern '{pattern}': {err}"))
                })?;
            Ok(Cond::Matches(regex))
        }
        "$like" => Ok(Cond::Wildcard(compile_wildcard(string_operand(
            op, operand,
        )?)?)),
        "$exists" => match operand.as_bool() {
            Some(expected) => Ok(Cond::Exists(expected)),
            None => Err(CoreError::query("$exists requires a boolean")),
        },
        other => Err(unknown_operator(other)),
    }
}

fn string_operand<'a>(op: &str, operand: &'a Value) -> CoreResult<&'a str> {
    operand
        .as_text()
        .ok_or_else(|| CoreError::query(format!("{op} requires a string operand")))
}

fn unknown_operator(op: &str) -> CoreError {
    CoreError::query(format!(
        "unknown operator: {op}. Valid operators: {VALID_OPERATORS}"
    ))
}

/// Translates a wildcard pattern into an anchored, case-insensitive regex.
///
/// `*` means zero-or-more of any character and `?` exactly one; every other
/// character matches literally.
fn compile_wildcard(pattern: &str) -> CoreResult<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            other => {
                let mut buf = [0u8; 4];
                translated.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    translated.push('$');

    RegexBuilder::new(&translated)
        .case_insensitive(true)
        .build()
        .map_err(|err| CoreError::query(format!("invalid wildcard pattern '{pattern}': {err}")))
}
