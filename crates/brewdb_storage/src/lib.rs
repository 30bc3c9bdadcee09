//! # brewdb Storage
//!
//! Snapshot storage backends for brewdb.
//!
//! A brewdb database is persisted as one complete snapshot per commit: the
//! whole serialized store replaces the previous serialized store atomically.
//! This crate provides the [`SnapshotBackend`] trait for that contract and
//! two implementations:
//!
//! - [`FileBackend`] - durable storage with write-temp/fsync/rename
//!   crash safety and optional backup copies
//! - [`InMemoryBackend`] - for tests and ephemeral databases
//!
//! Backends are **opaque byte stores**: they never interpret the snapshot
//! content. Serialization lives in `brewdb_core`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::SnapshotBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
