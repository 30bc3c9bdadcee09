//! Table statistics and database info reporting.
//!
//! Everything here is derived by scanning; none of it is cached or stored.

use crate::error::CoreResult;
use crate::store::{Store, Table};
use brewdb_codec::Value;
use serde::Serialize;
use std::collections::HashSet;

/// Aggregates for a field whose non-null values are all numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Mean value, rounded to 2 decimal places.
    pub avg: f64,
}

/// Per-field statistics within one table.
#[derive(Debug, Clone, Serialize)]
pub struct FieldStats {
    /// Field name.
    pub name: String,
    /// Number of rows carrying the field.
    pub present_count: usize,
    /// Share of rows carrying the field, as a percentage rounded to
    /// 2 decimal places.
    pub present_percentage: f64,
    /// Number of distinct non-null values.
    pub unique_count: usize,
    /// Number of rows where the field is present but null.
    pub null_count: usize,
    /// Type names seen among non-null values, in first-seen order.
    pub data_types: Vec<String>,
    /// Numeric aggregates, when every non-null value is a number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
}

/// Statistics for one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    /// Table name.
    pub table: String,
    /// Total row count.
    pub total_rows: usize,
    /// Per-field statistics, fields in first-seen order.
    pub fields: Vec<FieldStats>,
    /// Serialized size estimate of the table's records, in bytes.
    pub size_bytes: usize,
}

/// Row count for one table, as reported by [`DatabaseInfo`].
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Number of rows.
    pub row_count: usize,
}

/// Database-level metadata and per-table row counts.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    /// Path of the backing file, or `:memory:`.
    pub path: String,
    /// Creation timestamp.
    pub created: String,
    /// Last successful commit timestamp.
    pub last_modified: String,
    /// On-disk format version.
    pub version: String,
    /// Per-table row counts, in creation order.
    pub tables: Vec<TableInfo>,
    /// Number of tables.
    pub table_count: usize,
    /// Total rows across all tables.
    pub total_rows: usize,
}

/// Computes per-field statistics for a table.
pub(crate) fn table_stats(name: &str, table: &Table) -> CoreResult<TableStats> {
    let total_rows = table.len();
    if total_rows == 0 {
        return Ok(TableStats {
            table: name.to_string(),
            total_rows: 0,
            fields: Vec::new(),
            size_bytes: 0,
        });
    }

    let mut field_order: Vec<String> = Vec::new();
    for row in table {
        for (field, _) in row.iter() {
            if !field_order.iter().any(|seen| seen == field) {
                field_order.push(field.to_string());
            }
        }
    }

    let fields = field_order
        .into_iter()
        .map(|field| field_stats(field, table, total_rows))
        .collect();

    let size_bytes = brewdb_codec::encode(table)?.len();

    Ok(TableStats {
        table: name.to_string(),
        total_rows,
        fields,
        size_bytes,
    })
}

fn field_stats(name: String, table: &Table, total_rows: usize) -> FieldStats {
    let values: Vec<&Value> = table.iter().filter_map(|row| row.get(&name)).collect();
    let non_null: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();

    let unique: HashSet<String> = non_null.iter().map(|v| v.to_string()).collect();

    let mut data_types: Vec<String> = Vec::new();
    for value in &non_null {
        let type_name = value.type_name();
        if !data_types.iter().any(|seen| seen == type_name) {
            data_types.push(type_name.to_string());
        }
    }

    let numbers: Vec<f64> = non_null.iter().filter_map(|v| v.as_number()).collect();
    let numeric = if !numbers.is_empty() && numbers.len() == non_null.len() {
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = numbers.iter().sum::<f64>() / numbers.len() as f64;
        Some(NumericStats {
            min,
            max,
            avg: round2(avg),
        })
    } else {
        None
    };

    FieldStats {
        present_count: values.len(),
        present_percentage: round2(values.len() as f64 / total_rows as f64 * 100.0),
        unique_count: unique.len(),
        null_count: values.len() - non_null.len(),
        data_types,
        numeric,
        name,
    }
}

/// Gathers database metadata and per-table row counts.
pub(crate) fn database_info(path: &str, store: &Store) -> DatabaseInfo {
    let tables: Vec<TableInfo> = store
        .tables()
        .map(|(name, table)| TableInfo {
            name: name.to_string(),
            row_count: table.len(),
        })
        .collect();
    let total_rows = tables.iter().map(|table| table.row_count).sum();

    DatabaseInfo {
        path: path.to_string(),
        created: store.meta().created.clone(),
        last_modified: store.meta().last_modified.clone(),
        version: store.meta().version.clone(),
        table_count: tables.len(),
        total_rows,
        tables,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
