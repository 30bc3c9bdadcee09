//! CLI command implementations.

pub mod info;
pub mod query;
pub mod stats;
pub mod tables;

use brewdb_core::{Config, CoreResult, Database};
use std::path::Path;

/// Opens an existing database file read-only-ish: missing files are an
/// error rather than being created empty.
pub fn open_existing(path: &Path) -> CoreResult<Database> {
    Database::open_with_config(path, Config::default().create_if_missing(false))
}
