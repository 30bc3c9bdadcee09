//! # brewdb Codec
//!
//! Dynamic value model and JSON encoding/decoding for brewdb.
//!
//! This crate provides:
//! - [`Value`], a dynamic JSON-shaped value with a single numeric domain
//! - [`Record`], a string-keyed map that preserves field insertion order
//!   across encode/decode cycles
//! - [`encode_pretty`]/[`decode`] for the human-readable on-disk text form
//!
//! ## Ordering
//!
//! Documents are maps, and brewdb treats field order as data: a record written
//! with `name` before `age` reads back with `name` before `age`. The codec
//! therefore never sorts keys and rejects duplicate keys at decode time.
//!
//! ## Usage
//!
//! ```
//! use brewdb_codec::{decode, encode_pretty, Record, Value};
//!
//! let mut record = Record::new();
//! record.set("name", "Alice");
//! record.set("age", 30);
//!
//! let text = encode_pretty(&record).unwrap();
//! let back: Record = decode(&text).unwrap();
//! assert_eq!(record, back);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod record;
mod value;

pub use decoder::decode;
pub use encoder::{encode, encode_pretty};
pub use error::{CodecError, CodecResult};
pub use record::{Record, FIELD_INSERTED_AT, FIELD_UPDATED_AT};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_record_preserves_field_order() {
        let mut record = Record::new();
        record.set("zeta", 1);
        record.set("alpha", 2);
        record.set("mid", 3);

        let text = encode_pretty(&record).unwrap();
        let back: Record = decode(&text).unwrap();

        let names: Vec<&str> = back.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn roundtrip_nested_value() {
        let value = Value::Map(vec![
            (
                "users".to_string(),
                Value::Array(vec![Value::Map(vec![
                    ("name".to_string(), Value::from("Alice")),
                    ("age".to_string(), Value::from(30)),
                ])]),
            ),
            ("count".to_string(), Value::from(1)),
        ]);

        let text = encode(&value).unwrap();
        let back: Value = decode(&text).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn integral_numbers_encode_without_fraction() {
        let text = encode(&Value::from(30)).unwrap();
        assert_eq!(text, "30");

        let text = encode(&Value::Number(2.5)).unwrap();
        assert_eq!(text, "2.5");
    }

    #[test]
    fn malformed_text_is_a_syntax_error() {
        let result: CodecResult<Value> = decode("{\"a\": ");
        assert!(matches!(result, Err(CodecError::Syntax(_))));
    }
}
