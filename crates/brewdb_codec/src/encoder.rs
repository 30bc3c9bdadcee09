//! JSON encoding.

use crate::error::CodecResult;
use crate::record::Record;
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Encode a value as compact JSON text.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as JSON
/// (e.g. a non-finite number).
pub fn encode<T: Serialize>(value: &T) -> CodecResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Encode a value as pretty-printed JSON text.
///
/// This is the on-disk form: 2-space indentation, one field per line,
/// insertion order preserved.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as JSON.
pub fn encode_pretty<T: Serialize>(value: &T) -> CodecResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serialize_number(*n, serializer),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Integral finite numbers serialize as JSON integers so stored files stay
/// readable; everything else serializes as a float.
fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.is_finite() && n.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(&n) {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}
