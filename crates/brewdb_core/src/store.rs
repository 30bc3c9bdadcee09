//! In-memory store: named tables plus database metadata.

use crate::error::{CoreError, CoreResult};
use brewdb_codec::Record;
use chrono::{SecondsFormat, Utc};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key the metadata record is stored under in the on-disk document.
pub(crate) const META_KEY: &str = "_meta";

/// Current time as an RFC 3339 UTC string, the format used for all
/// timestamps in the store.
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Database metadata, persisted alongside the tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Table names, mirroring the store's table keys in the same order.
    pub tables: Vec<String>,
    /// Creation timestamp, set once.
    pub created: String,
    /// Last successful commit timestamp.
    pub last_modified: String,
    /// On-disk format version.
    pub version: String,
}

impl Meta {
    fn new(version: &str) -> Self {
        let now = timestamp_now();
        Self {
            tables: Vec::new(),
            created: now.clone(),
            last_modified: now,
            version: version.to_string(),
        }
    }
}

/// An ordered sequence of records.
pub type Table = Vec<Record>;

/// The full database content: an ordered map of table name to table,
/// plus metadata.
///
/// Table order is creation order and survives encode/decode cycles. The
/// metadata's `tables` list is rewritten from the actual table keys on
/// every commit (see [`Store::sync_meta`]), so a persisted store always
/// satisfies the mirror invariant.
///
/// `Clone` produces the deep snapshot used for transaction rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    meta: Meta,
    tables: Vec<(String, Table)>,
}

impl Store {
    /// Creates an empty store with fresh metadata.
    #[must_use]
    pub fn new(version: &str) -> Self {
        Self {
            meta: Meta::new(version),
            tables: Vec::new(),
        }
    }

    /// Returns the store metadata.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Returns a table by name.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if no such table exists.
    pub fn table(&self, name: &str) -> CoreResult<&Table> {
        self.tables
            .iter()
            .find(|(table_name, _)| table_name == name)
            .map(|(_, table)| table)
            .ok_or_else(|| CoreError::table_not_found(name))
    }

    /// Returns a table by name for mutation.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if no such table exists.
    pub fn table_mut(&mut self, name: &str) -> CoreResult<&mut Table> {
        self.tables
            .iter_mut()
            .find(|(table_name, _)| table_name == name)
            .map(|(_, table)| table)
            .ok_or_else(|| CoreError::table_not_found(name))
    }

    /// Whether a table with this name exists.
    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.iter().any(|(table_name, _)| table_name == name)
    }

    /// Iterates tables in creation order.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables
            .iter()
            .map(|(name, table)| (name.as_str(), table))
    }

    /// Table names in creation order.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Registers a new empty table.
    ///
    /// # Errors
    ///
    /// Returns `Query` for an empty name or a name starting with `_`
    /// (reserved for internal use), and `TableExists` for a duplicate.
    pub fn create_table(&mut self, name: &str) -> CoreResult<()> {
        if name.is_empty() {
            return Err(CoreError::query("table name must not be empty"));
        }
        if name.starts_with('_') {
            return Err(CoreError::query(
                "table names cannot start with underscore (reserved for internal use)",
            ));
        }
        if self.contains_table(name) {
            return Err(CoreError::table_exists(name));
        }
        self.tables.push((name.to_string(), Table::new()));
        self.meta.tables.push(name.to_string());
        Ok(())
    }

    /// Removes a table and its metadata entry, returning its records.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound` if no such table exists.
    pub fn drop_table(&mut self, name: &str) -> CoreResult<Table> {
        let index = self
            .tables
            .iter()
            .position(|(table_name, _)| table_name == name)
            .ok_or_else(|| CoreError::table_not_found(name))?;
        let (_, table) = self.tables.remove(index);
        self.meta.tables.retain(|table_name| table_name != name);
        Ok(table)
    }

    /// Rewrites the metadata for a commit: the table list is refreshed from
    /// the actual table keys and `last_modified` is set to now.
    pub fn sync_meta(&mut self) {
        self.meta.tables = self.table_names();
        self.meta.last_modified = timestamp_now();
    }

    /// Serializes the store to the pretty-printed on-disk text form.
    ///
    /// # Errors
    ///
    /// Returns a codec error if serialization fails.
    pub fn encode(&self) -> CoreResult<String> {
        Ok(brewdb_codec::encode_pretty(self)?)
    }

    /// Parses a store from its on-disk text form.
    ///
    /// # Errors
    ///
    /// Returns a codec error for malformed content; a malformed file is
    /// never silently treated as empty.
    pub fn decode(text: &str) -> CoreResult<Self> {
        Ok(brewdb_codec::decode(text)?)
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len() + 1))?;
        map.serialize_entry(META_KEY, &self.meta)?;
        for (name, table) in &self.tables {
            map.serialize_entry(name, table)?;
        }
        map.end()
    }
}

struct StoreVisitor;

impl<'de> Visitor<'de> for StoreVisitor {
    type Value = Store;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a database document object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Store, A::Error> {
        let mut meta: Option<Meta> = None;
        let mut tables: Vec<(String, Table)> = Vec::new();

        while let Some(key) = map.next_key::<String>()? {
            if key == META_KEY {
                if meta.is_some() {
                    return Err(de::Error::custom("duplicate _meta entry"));
                }
                meta = Some(map.next_value()?);
            } else {
                if tables.iter().any(|(name, _)| *name == key) {
                    return Err(de::Error::custom(format!("duplicate table `{key}`")));
                }
                let table: Table = map.next_value()?;
                tables.push((key, table));
            }
        }

        // A document written before the metadata record existed still loads;
        // the metadata is rebuilt from the table keys.
        let meta = meta.unwrap_or_else(|| {
            let mut rebuilt = Meta::new(crate::config::FORMAT_VERSION);
            rebuilt.tables = tables.iter().map(|(name, _)| name.clone()).collect();
            rebuilt
        });

        Ok(Store { meta, tables })
    }
}

impl<'de> Deserialize<'de> for Store {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StoreVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewdb_codec::Value;

    #[test]
    fn create_and_lookup_tables() {
        let mut store = Store::new("1.0.0");
        store.create_table("users").unwrap();
        store.create_table("orders").unwrap();

        assert!(store.contains_table("users"));
        assert!(store.table("users").unwrap().is_empty());
        assert_eq!(store.table_names(), vec!["users", "orders"]);
        assert_eq!(store.meta().tables, vec!["users", "orders"]);
    }

    #[test]
    fn invalid_table_names_are_rejected() {
        let mut store = Store::new("1.0.0");
        assert!(matches!(
            store.create_table(""),
            Err(CoreError::Query { .. })
        ));
        assert!(matches!(
            store.create_table("_meta"),
            Err(CoreError::Query { .. })
        ));

        store.create_table("users").unwrap();
        assert!(matches!(
            store.create_table("users"),
            Err(CoreError::TableExists { .. })
        ));
    }

    #[test]
    fn drop_table_removes_metadata_entry() {
        let mut store = Store::new("1.0.0");
        store.create_table("users").unwrap();
        store.create_table("orders").unwrap();

        store.drop_table("users").unwrap();
        assert_eq!(store.table_names(), vec!["orders"]);
        assert_eq!(store.meta().tables, vec!["orders"]);

        assert!(matches!(
            store.drop_table("users"),
            Err(CoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn missing_table_lookup_fails() {
        let store = Store::new("1.0.0");
        assert!(matches!(
            store.table("nope"),
            Err(CoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn encode_puts_meta_first() {
        let mut store = Store::new("1.0.0");
        store.create_table("users").unwrap();

        let text = store.encode().unwrap();
        let meta_pos = text.find("\"_meta\"").unwrap();
        let users_pos = text.find("\"users\"").unwrap();
        assert!(meta_pos < users_pos);
    }

    #[test]
    fn roundtrip_preserves_tables_and_meta() {
        let mut store = Store::new("1.0.0");
        store.create_table("users").unwrap();
        let mut record = Record::new();
        record.set("name", "Alice");
        store.table_mut("users").unwrap().push(record);
        store.sync_meta();

        let text = store.encode().unwrap();
        let back = Store::decode(&text).unwrap();

        assert_eq!(back, store);
        assert_eq!(
            back.table("users").unwrap()[0].get("name"),
            Some(&Value::from("Alice"))
        );
    }

    #[test]
    fn document_without_meta_rebuilds_it() {
        let store = Store::decode("{\"users\": []}").unwrap();
        assert_eq!(store.meta().tables, vec!["users"]);
        assert!(store.contains_table("users"));
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Store::decode("{\"users\": 42}").is_err());
        assert!(Store::decode("[1, 2]").is_err());
        assert!(Store::decode("not json").is_err());
    }

    #[test]
    fn sync_meta_refreshes_mirror_and_timestamp() {
        let mut store = Store::new("1.0.0");
        store.create_table("users").unwrap();
        let before = store.meta().last_modified.clone();

        store.sync_meta();
        assert_eq!(store.meta().tables, vec!["users"]);
        assert!(store.meta().last_modified >= before);
    }
}
