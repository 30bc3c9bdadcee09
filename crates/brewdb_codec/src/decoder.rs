//! JSON decoding.

use crate::error::CodecResult;
use crate::record::Record;
use crate::value::Value;
use serde::de::{self, Deserialize, DeserializeOwned, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// Decode a value from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not well-formed JSON, or if an object
/// contains a duplicate key.
pub fn decode<T: DeserializeOwned>(text: &str) -> CodecResult<T> {
    Ok(serde_json::from_str(text)?)
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::Number(n as f64))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        Ok(Value::Number(n))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::Text(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::Text(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        Ok(Value::Map(collect_entries(&mut map)?))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Record, A::Error> {
        let entries = collect_entries(&mut map)?;
        Ok(entries.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Collects map entries in document order, rejecting duplicate keys.
fn collect_entries<'de, A: MapAccess<'de>>(
    map: &mut A,
) -> Result<Vec<(String, Value)>, A::Error> {
    let mut entries: Vec<(String, Value)> = Vec::new();
    while let Some((key, value)) = map.next_entry::<String, Value>()? {
        if entries.iter().any(|(existing, _)| *existing == key) {
            return Err(de::Error::custom(format!("duplicate key `{key}`")));
        }
        entries.push((key, value));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn scalars_decode() {
        assert_eq!(decode::<Value>("null").unwrap(), Value::Null);
        assert_eq!(decode::<Value>("true").unwrap(), Value::Bool(true));
        assert_eq!(decode::<Value>("42").unwrap(), Value::Number(42.0));
        assert_eq!(decode::<Value>("2.5").unwrap(), Value::Number(2.5));
        assert_eq!(
            decode::<Value>("\"hi\"").unwrap(),
            Value::Text("hi".to_string())
        );
    }

    #[test]
    fn objects_decode_in_document_order() {
        let value: Value = decode("{\"z\": 1, \"a\": 2}").unwrap();
        assert_eq!(
            value,
            Value::Map(vec![
                ("z".to_string(), Value::Number(1.0)),
                ("a".to_string(), Value::Number(2.0)),
            ])
        );
    }

    #[test]
    fn record_decodes_nested_values() {
        let record: Record = decode("{\"name\": \"Alice\", \"tags\": [\"a\", \"b\"]}").unwrap();
        assert_eq!(record.get("name"), Some(&Value::from("Alice")));
        assert_eq!(
            record.get("tags"),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = decode::<Record>("{\"a\": 1, \"a\": 2}");
        assert!(matches!(result, Err(CodecError::Syntax(_))));
    }

    mod properties {
        use super::*;
        use crate::encoder::encode;
        use proptest::prelude::*;

        fn scalar() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i32>().prop_map(|n| Value::Number(f64::from(n))),
                "[a-zA-Z0-9 _-]{0,12}".prop_map(Value::Text),
            ]
        }

        proptest! {
            #[test]
            fn scalars_roundtrip(value in scalar()) {
                let text = encode(&value).unwrap();
                let back: Value = decode(&text).unwrap();
                prop_assert_eq!(back, value);
            }

            #[test]
            fn records_roundtrip_with_order(
                entries in proptest::collection::vec(("[a-z]{1,8}", scalar()), 0..6)
            ) {
                let mut record = Record::new();
                for (name, value) in &entries {
                    record.set(name.clone(), value.clone());
                }

                let text = encode(&record).unwrap();
                let back: Record = decode(&text).unwrap();
                prop_assert_eq!(back, record);
            }
        }
    }
}
