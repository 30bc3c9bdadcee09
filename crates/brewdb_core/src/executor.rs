//! Query execution over a single table.
//!
//! These functions implement the scan/filter/mutate paths. They operate on a
//! table that has already been resolved by name; table lookup errors belong
//! to the caller. Mutating paths are two-phase where a caller-supplied
//! function can fail: every replacement is computed before any row changes,
//! so a failure applies nothing.

use crate::error::CoreResult;
use crate::query::Filter;
use crate::store::{timestamp_now, Table};
use brewdb_codec::{Record, Value, FIELD_INSERTED_AT, FIELD_UPDATED_AT};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Options for a `select` call: projection, pagination, and ordering.
///
/// # Example
///
/// ```
/// use brewdb_core::SelectOptions;
///
/// let options = SelectOptions::new()
///     .order_by("score")
///     .reverse(true)
///     .limit(3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Fields to keep in the output records; `None` keeps all.
    pub fields: Option<Vec<String>>,
    /// Maximum number of rows to return.
    pub limit: Option<usize>,
    /// Number of matching rows to skip before collecting.
    pub offset: usize,
    /// Field to sort by before pagination.
    pub order_by: Option<String>,
    /// Sort descending instead of ascending.
    pub reverse: bool,
}

impl SelectOptions {
    /// Creates options with no projection, pagination, or ordering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the named fields in each output record.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Caps the number of returned rows.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many matching rows.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Sorts by the named field before pagination.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Flips the sort direction.
    #[must_use]
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

/// How `update` rewrites each matching record.
#[derive(Clone)]
pub enum Updater {
    /// Shallow overlay of the given fields onto the existing record.
    /// Reserved fields in the overlay are ignored.
    Merge(Record),
    /// Full replacement computed by a function from the existing record.
    Transform(Arc<dyn Fn(&Record) -> CoreResult<Record> + Send + Sync>),
}

impl Updater {
    /// Creates a merge-overlay updater.
    #[must_use]
    pub fn merge(overlay: Record) -> Self {
        Self::Merge(overlay)
    }

    /// Creates a transform updater from a replacement function.
    pub fn transform(f: impl Fn(&Record) -> CoreResult<Record> + Send + Sync + 'static) -> Self {
        Self::Transform(Arc::new(f))
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Updater::Merge(overlay) => f.debug_tuple("Merge").field(overlay).finish(),
            Updater::Transform(_) => f.debug_tuple("Transform").field(&"<fn>").finish(),
        }
    }
}

/// Scans a table and returns matching records, ordered, paginated, and
/// projected per `options`. Never mutates the table.
pub(crate) fn select(table: &Table, filter: Option<&Filter>, options: &SelectOptions) -> Vec<Record> {
    let mut rows: Vec<&Record> = table
        .iter()
        .filter(|row| filter.map_or(true, |f| f.matches(row)))
        .collect();

    if let Some(field) = &options.order_by {
        // Missing fields and nulls sort below any present value. The sort is
        // stable and the comparator is flipped for descending order, so ties
        // keep their insertion order either way.
        if options.reverse {
            rows.sort_by(|a, b| compare_keys(sort_key(b, field), sort_key(a, field)));
        } else {
            rows.sort_by(|a, b| compare_keys(sort_key(a, field), sort_key(b, field)));
        }
    }

    let paged = rows.into_iter().skip(options.offset);
    let paged: Vec<&Record> = match options.limit {
        Some(limit) => paged.take(limit).collect(),
        None => paged.collect(),
    };

    match &options.fields {
        Some(fields) => paged.into_iter().map(|row| project(row, fields)).collect(),
        None => paged.into_iter().cloned().collect(),
    }
}

/// Counts matching records without cloning any.
pub(crate) fn count(table: &Table, filter: Option<&Filter>) -> usize {
    table
        .iter()
        .filter(|row| filter.map_or(true, |f| f.matches(row)))
        .count()
}

/// Appends one record, stamping both reserved timestamps.
pub(crate) fn insert(table: &mut Table, record: Record) -> CoreResult<()> {
    validate_record(&record)?;
    table.push(stamp_new(record));
    Ok(())
}

/// Appends records in call order. All rows are validated before any is
/// appended, so a rejected row means nothing was inserted.
pub(crate) fn insert_many(table: &mut Table, records: Vec<Record>) -> CoreResult<usize> {
    for record in &records {
        validate_record(record)?;
    }
    let count = records.len();
    table.reserve(count);
    for record in records {
        table.push(stamp_new(record));
    }
    Ok(count)
}

/// Rewrites matching records in place and returns how many changed.
///
/// Replacements are computed for every match before any row is written, so a
/// failing transform leaves the table untouched. `_inserted_at` is carried
/// over from the existing record; `_updated_at` is restamped.
pub(crate) fn update(table: &mut Table, filter: &Filter, updater: &Updater) -> CoreResult<usize> {
    let mut staged: Vec<(usize, Record)> = Vec::new();

    for (index, row) in table.iter().enumerate() {
        if !filter.matches(row) {
            continue;
        }
        let mut replacement = match updater {
            Updater::Merge(overlay) => {
                let mut merged = row.clone();
                for (name, value) in overlay.iter() {
                    if !Record::is_reserved_field(name) {
                        merged.set(name, value.clone());
                    }
                }
                merged
            }
            Updater::Transform(f) => f(row)?,
        };
        if let Some(inserted_at) = row.get(FIELD_INSERTED_AT) {
            replacement.set(FIELD_INSERTED_AT, inserted_at.clone());
        }
        replacement.set(FIELD_UPDATED_AT, Value::from(timestamp_now()));
        staged.push((index, replacement));
    }

    let changed = staged.len();
    for (index, replacement) in staged {
        table[index] = replacement;
    }
    Ok(changed)
}

/// Removes matching records, preserving the relative order of the rest.
pub(crate) fn delete(table: &mut Table, filter: &Filter) -> usize {
    let before = table.len();
    table.retain(|row| !filter.matches(row));
    before - table.len()
}

fn validate_record(record: &Record) -> CoreResult<()> {
    if record.iter().any(|(name, _)| name.is_empty()) {
        return Err(crate::error::CoreError::invalid_record(
            "field names must not be empty",
        ));
    }
    Ok(())
}

fn stamp_new(mut record: Record) -> Record {
    let now = timestamp_now();
    record.set(FIELD_INSERTED_AT, Value::from(now.clone()));
    record.set(FIELD_UPDATED_AT, Value::from(now));
    record
}

fn sort_key<'a>(row: &'a Record, field: &str) -> Option<&'a Value> {
    row.get(field).filter(|value| !value.is_null())
}

fn compare_keys(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp_ordinal(y),
    }
}

fn project(row: &Record, fields: &[String]) -> Record {
    row.iter()
        .filter(|(name, _)| fields.iter().any(|field| field == name))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn record(json: &str) -> Record {
        brewdb_codec::decode(json).unwrap()
    }

    fn filter(json: &str) -> Filter {
        let expr: Value = brewdb_codec::decode(json).unwrap();
        Filter::parse(&expr).unwrap()
    }

    fn ages(table: &[Record]) -> Vec<f64> {
        table
            .iter()
            .map(|row| row.get("age").and_then(Value::as_number).unwrap())
            .collect()
    }

    fn seeded() -> Table {
        let mut table = Table::new();
        insert(&mut table, record("{\"name\": \"Alice\", \"age\": 30}")).unwrap();
        insert(&mut table, record("{\"name\": \"Bob\", \"age\": 25}")).unwrap();
        insert(&mut table, record("{\"name\": \"Carol\", \"age\": 30}")).unwrap();
        table
    }

    #[test]
    fn insert_stamps_both_timestamps() {
        let mut table = Table::new();
        insert(&mut table, record("{\"name\": \"Alice\"}")).unwrap();

        let row = &table[0];
        assert!(row.contains(FIELD_INSERTED_AT));
        assert_eq!(row.get(FIELD_INSERTED_AT), row.get(FIELD_UPDATED_AT));
    }

    #[test]
    fn insert_overwrites_caller_supplied_reserved_fields() {
        let mut table = Table::new();
        insert(
            &mut table,
            record("{\"name\": \"Alice\", \"_inserted_at\": \"bogus\"}"),
        )
        .unwrap();
        assert_ne!(table[0].get(FIELD_INSERTED_AT), Some(&Value::from("bogus")));
    }

    #[test]
    fn insert_many_appends_in_order_with_nondecreasing_timestamps() {
        let mut table = Table::new();
        let count = insert_many(
            &mut table,
            vec![
                record("{\"n\": 1}"),
                record("{\"n\": 2}"),
                record("{\"n\": 3}"),
            ],
        )
        .unwrap();

        assert_eq!(count, 3);
        let stamps: Vec<&str> = table
            .iter()
            .map(|row| row.get(FIELD_INSERTED_AT).unwrap().as_text().unwrap())
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
        let ns: Vec<f64> = table
            .iter()
            .map(|row| row.get("n").and_then(Value::as_number).unwrap())
            .collect();
        assert_eq!(ns, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn insert_many_rejects_all_rows_on_one_bad_row() {
        let mut table = Table::new();
        let mut bad = Record::new();
        bad.set("", 1);

        let result = insert_many(&mut table, vec![record("{\"n\": 1}"), bad]);
        assert!(matches!(result, Err(CoreError::InvalidRecord { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn select_keeps_insertion_order_without_ordering() {
        let table = seeded();
        let rows = select(&table, None, &SelectOptions::new());
        assert_eq!(ages(&rows), vec![30.0, 25.0, 30.0]);
    }

    #[test]
    fn select_filters_rows() {
        let table = seeded();
        let rows = select(
            &table,
            Some(&filter("{\"age\": {\"$gte\": 30}}")),
            &SelectOptions::new(),
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn reverse_sort_is_stable_for_ties() {
        let table = seeded();
        let rows = select(
            &table,
            None,
            &SelectOptions::new().order_by("age").reverse(true),
        );
        assert_eq!(ages(&rows), vec![30.0, 30.0, 25.0]);
        // The two 30s keep their insertion order.
        assert_eq!(rows[0].get("name"), Some(&Value::from("Alice")));
        assert_eq!(rows[1].get("name"), Some(&Value::from("Carol")));
    }

    #[test]
    fn missing_sort_keys_sort_first() {
        let mut table = seeded();
        insert(&mut table, record("{\"name\": \"Dana\"}")).unwrap();
        insert(&mut table, record("{\"name\": \"Eve\", \"age\": null}")).unwrap();

        let rows = select(&table, None, &SelectOptions::new().order_by("age"));
        assert_eq!(rows[0].get("name"), Some(&Value::from("Dana")));
        assert_eq!(rows[1].get("name"), Some(&Value::from("Eve")));
        assert_eq!(ages(&rows[2..]), vec![25.0, 30.0, 30.0]);
    }

    #[test]
    fn offset_then_limit() {
        let table = seeded();
        let rows = select(
            &table,
            None,
            &SelectOptions::new().order_by("age").offset(1).limit(1),
        );
        assert_eq!(ages(&rows), vec![30.0]);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn projection_preserves_record_field_order_and_omits_absent() {
        let mut table = Table::new();
        insert(
            &mut table,
            record("{\"name\": \"Alice\", \"age\": 30, \"city\": \"Paris\"}"),
        )
        .unwrap();

        // Requested order differs from record order; record order wins.
        let rows = select(&table, None, &SelectOptions::new().fields(["city", "name", "score"]));
        let names: Vec<&str> = rows[0].iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "city"]);
    }

    #[test]
    fn update_merge_overlays_and_restamps() {
        let mut table = seeded();
        let bob_stamp = table[1].get(FIELD_INSERTED_AT).cloned();
        let alice_stamp = table[0].get(FIELD_INSERTED_AT).cloned();

        let changed = update(
            &mut table,
            &filter("{\"age\": {\"$gte\": 30}}"),
            &Updater::merge(record("{\"category\": \"senior\"}")),
        )
        .unwrap();

        assert_eq!(changed, 2);
        assert_eq!(table[0].get("category"), Some(&Value::from("senior")));
        assert!(!table[1].contains("category"));
        assert_eq!(table[2].get("category"), Some(&Value::from("senior")));
        // Untouched rows keep their stamps; changed rows keep _inserted_at.
        assert_eq!(table[1].get(FIELD_INSERTED_AT).cloned(), bob_stamp);
        assert_eq!(table[0].get(FIELD_INSERTED_AT).cloned(), alice_stamp);
    }

    #[test]
    fn update_merge_ignores_reserved_overlay_fields() {
        let mut table = seeded();
        let original = table[0].get(FIELD_INSERTED_AT).cloned();

        update(
            &mut table,
            &filter("{\"name\": \"Alice\"}"),
            &Updater::merge(record("{\"_inserted_at\": \"bogus\", \"age\": 31}")),
        )
        .unwrap();

        assert_eq!(table[0].get(FIELD_INSERTED_AT).cloned(), original);
        assert_eq!(table[0].get("age"), Some(&Value::from(31)));
    }

    #[test]
    fn update_transform_replaces_but_keeps_inserted_at() {
        let mut table = seeded();
        let original = table[0].get(FIELD_INSERTED_AT).cloned();

        let changed = update(
            &mut table,
            &filter("{\"name\": \"Alice\"}"),
            &Updater::transform(|row| {
                let mut replacement = Record::new();
                replacement.set("name", row.get("name").cloned().unwrap_or(Value::Null));
                replacement.set("renamed", true);
                Ok(replacement)
            }),
        )
        .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(table[0].get("renamed"), Some(&Value::from(true)));
        assert!(!table[0].contains("age"));
        assert_eq!(table[0].get(FIELD_INSERTED_AT).cloned(), original);
        assert!(table[0].contains(FIELD_UPDATED_AT));
    }

    #[test]
    fn failing_transform_changes_nothing() {
        let mut table = seeded();
        let before = table.clone();

        let result = update(
            &mut table,
            &filter("{\"age\": 30}"),
            &Updater::transform(|row| {
                if row.get("name") == Some(&Value::from("Carol")) {
                    Err(CoreError::invalid_record("no carols"))
                } else {
                    Ok(row.clone())
                }
            }),
        );

        assert!(result.is_err());
        assert_eq!(table, before);
    }

    #[test]
    fn update_replaces_in_place_without_reordering() {
        let mut table = seeded();
        update(
            &mut table,
            &filter("{\"name\": \"Bob\"}"),
            &Updater::merge(record("{\"age\": 26}")),
        )
        .unwrap();

        let names: Vec<&Value> = table.iter().map(|r| r.get("name").unwrap()).collect();
        assert_eq!(
            names,
            vec![
                &Value::from("Alice"),
                &Value::from("Bob"),
                &Value::from("Carol")
            ]
        );
        assert_eq!(table[1].get("age"), Some(&Value::from(26)));
    }

    #[test]
    fn delete_preserves_survivor_order() {
        let mut table = seeded();
        let removed = delete(&mut table, &filter("{\"age\": 30}"));

        assert_eq!(removed, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].get("name"), Some(&Value::from("Bob")));
    }

    #[test]
    fn count_with_and_without_filter() {
        let table = seeded();
        assert_eq!(count(&table, None), 3);
        assert_eq!(count(&table, Some(&filter("{\"age\": 30}"))), 2);
        assert_eq!(count(&table, Some(&filter("{\"age\": 99}"))), 0);
    }

    #[test]
    fn custom_predicate_drives_the_scan() {
        let table = seeded();
        let predicate = Filter::from_fn(|row| {
            row.get("name")
                .and_then(Value::as_text)
                .is_some_and(|name| name.len() == 3)
        });
        let rows = select(&table, Some(&predicate), &SelectOptions::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Bob")));
    }
}
