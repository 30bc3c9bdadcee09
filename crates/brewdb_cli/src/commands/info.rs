//! Info command implementation.

use std::path::Path;

/// Runs the info command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path)?;
    let info = db.info();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&info)?),
        _ => {
            println!("Database: {}", info.path);
            println!("Version: {}", info.version);
            println!("Created: {}", info.created);
            println!("Last modified: {}", info.last_modified);
            println!("Tables: {} ({} rows total)", info.table_count, info.total_rows);
            for table in &info.tables {
                println!("  {} - {} rows", table.name, table.row_count);
            }
        }
    }

    Ok(())
}
