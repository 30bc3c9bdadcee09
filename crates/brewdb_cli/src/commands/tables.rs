//! Tables command implementation.

use std::path::Path;

/// Runs the tables command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_existing(path)?;
    for name in db.list_tables() {
        println!("{name}");
    }
    Ok(())
}
