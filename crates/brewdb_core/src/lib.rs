//! # brewdb Core
//!
//! Core database engine for brewdb: an embedded, file-backed tabular store.
//!
//! A database is a named collection of tables, each an ordered sequence of
//! loosely-structured records, persisted as one human-readable JSON file.
//! This crate provides:
//!
//! - Filter parsing and predicate evaluation (`$eq`, `$gt`, `$between`,
//!   `$in`, `$regex`, wildcards, `$or`, and friends)
//! - Query execution: full-scan select with projection, stable ordering,
//!   and pagination; merge/transform updates; ordered deletes
//! - Transaction scopes with deep-snapshot rollback
//! - Crash-safe persistence through atomic snapshot replacement
//! - Table lifecycle, statistics, and info reporting
//!
//! ## Example
//!
//! ```no_run
//! use brewdb_core::{Database, Filter, Record, SelectOptions, Value};
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("app.json")).unwrap();
//! db.create_table("users").unwrap();
//!
//! let mut user = Record::new();
//! user.set("name", "Alice");
//! user.set("age", 28);
//! db.insert("users", user).unwrap();
//!
//! let expr: Value = brewdb_codec::decode("{\"age\": {\"$gte\": 18}}").unwrap();
//! let adults = db
//!     .select(
//!         "users",
//!         Some(&Filter::parse(&expr).unwrap()),
//!         SelectOptions::new().order_by("age"),
//!     )
//!     .unwrap();
//! assert_eq!(adults.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod executor;
mod query;
mod stats;
mod store;
mod transaction;

pub use brewdb_codec::{Record, Value, FIELD_INSERTED_AT, FIELD_UPDATED_AT};
pub use config::{Config, FORMAT_VERSION};
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use executor::{SelectOptions, Updater};
pub use query::Filter;
pub use stats::{DatabaseInfo, FieldStats, NumericStats, TableInfo, TableStats};
pub use store::{Meta, Store, Table};
pub use transaction::{Transaction, TransactionState};

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
