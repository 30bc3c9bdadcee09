//! Stats command implementation.

use std::path::Path;

/// Runs the stats command.
pub fn run(path: &Path, table: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path)?;
    let stats = db.stats(table)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&stats)?),
        _ => {
            println!("Table '{}': {} rows", stats.table, stats.total_rows);
            println!("Size: {} bytes", stats.size_bytes);
            for field in &stats.fields {
                println!("  {}:", field.name);
                println!(
                    "    present in {} rows ({}%)",
                    field.present_count, field.present_percentage
                );
                println!("    unique values: {}", field.unique_count);
                if field.null_count > 0 {
                    println!("    nulls: {}", field.null_count);
                }
                println!("    types: {}", field.data_types.join(", "));
                if let Some(numeric) = &field.numeric {
                    println!(
                        "    range: {} - {} (avg: {})",
                        numeric.min, numeric.max, numeric.avg
                    );
                }
            }
        }
    }

    Ok(())
}
