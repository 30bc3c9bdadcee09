//! Query command implementation.

use brewdb_codec::Value;
use brewdb_core::{Filter, SelectOptions};
use std::path::Path;

/// Runs the query command.
#[allow(clippy::too_many_arguments)]
pub fn run(
    path: &Path,
    table: &str,
    filter: Option<&str>,
    fields: Option<&str>,
    limit: Option<usize>,
    offset: usize,
    order_by: Option<&str>,
    reverse: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path)?;

    let filter = filter
        .map(|text| {
            let expr: Value = brewdb_codec::decode(text)?;
            Filter::parse(&expr)
        })
        .transpose()?;

    let mut options = SelectOptions::new().offset(offset).reverse(reverse);
    if let Some(fields) = fields {
        options = options.fields(fields.split(',').map(str::trim));
    }
    if let Some(limit) = limit {
        options = options.limit(limit);
    }
    if let Some(order_by) = order_by {
        options = options.order_by(order_by);
    }

    let rows = db.select(table, filter.as_ref(), options)?;
    for row in &rows {
        println!("{}", brewdb_codec::encode(row)?);
    }
    eprintln!("{} row(s)", rows.len());

    Ok(())
}
