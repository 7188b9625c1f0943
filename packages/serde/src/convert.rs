//! Conversions between Value and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;

use confentry_core::Value;

use crate::Error;

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    Ok(serde_json::from_value(value_to_json(value))?)
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    Ok(json_to_value(serde_json::to_value(data)?))
}

/// Convert our Value to serde_json::Value.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for numbers f64 cannot hold
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;
    use confentry_core::{ConfigEntry, ServiceConfigEntry};

    #[test]
    fn json_to_value_numbers() {
        let json = serde_json::json!({
            "integer": 42,
            "float": 2.75,
            "negative": -100,
            "huge": 18446744073709551615u64
        });

        let value = json_to_value(json);
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.get("integer"), Some(&Value::Integer(42)));
        assert_eq!(map.get("negative"), Some(&Value::Integer(-100)));
        assert_eq!(map.get("float"), Some(&Value::Float(2.75)));
        assert!(matches!(map.get("huge"), Some(Value::Float(_))));
    }

    #[test]
    fn value_to_json_nan_becomes_null() {
        assert_eq!(value_to_json(Value::Float(f64::NAN)), serde_json::Value::Null);
    }

    #[test]
    fn value_to_json_nested() {
        let value = Value::Map(btree! {
            "key".into() => Value::from("value"),
            "list".into() => Value::from(vec![1i64, 2, 3]),
            "none".into() => Value::Null,
        });

        assert_eq!(
            value_to_json(value),
            serde_json::json!({"key": "value", "list": [1, 2, 3], "none": null})
        );
    }

    #[test]
    fn json_to_value_object() {
        let value = json_to_value(serde_json::json!({"a": [true, "two"], "b": {}}));
        assert_eq!(
            value,
            Value::Map(btree! {
                "a".into() => Value::Array(vec![Value::Bool(true), Value::from("two")]),
                "b".into() => Value::map(),
            })
        );
    }

    #[test]
    fn entries_roundtrip_through_value() {
        let entry = ConfigEntry::ServiceDefaults(ServiceConfigEntry {
            name: "web".to_string(),
            protocol: "grpc".to_string(),
            ..Default::default()
        });

        let value = to_value(&entry).unwrap();
        assert_eq!(
            value.get_ignore_case("Kind"),
            Some(&Value::from("service-defaults"))
        );

        let back: ConfigEntry = from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn from_value_error() {
        let result: Result<ConfigEntry, _> = from_value(Value::from("not an entry"));
        assert!(result.is_err());
    }
}
