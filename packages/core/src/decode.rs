//! Discriminator-first decoding of untyped payloads.
//!
//! Decoding runs in two steps:
//! 1. Read the `Kind` (or `kind`) key and ask the registry for a zero-valued
//!    entry of that kind.
//! 2. Let the entry pull its fields out of the payload through [`Fields`].
//!
//! Field names match exactly first and case-insensitively second. Keys that
//! match no field are ignored, and `null` counts as absent. The first
//! coercion failure aborts the decode.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::registry::{builtin_registry, KindRegistry};
use crate::value::find_ignore_case;
use crate::{parse_duration, ConfigEntry, DecodeError, Value};

/// A shape that can fill itself from a [`Fields`] view.
///
/// Implementations call one `Fields` method per field; each method leaves the
/// target untouched when the key is absent.
pub trait DecodeFields {
    fn decode_fields(&mut self, fields: &Fields<'_>) -> Result<(), DecodeError>;
}

/// A read-only view over one level of an untyped map.
///
/// Keeps the dotted path of the map it views so mismatches name the full
/// key, e.g. `Subsets.v1.OnlyPassing` or `Splits[0].Weight`.
pub struct Fields<'a> {
    map: &'a BTreeMap<String, Value>,
    prefix: String,
}

fn mismatch(key: String, expected: &'static str, actual: &Value) -> DecodeError {
    DecodeError::Mismatch {
        key,
        expected,
        actual: actual.type_name(),
    }
}

fn coerce_string(key: &str, value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(mismatch(key.to_string(), "string", other)),
    }
}

fn coerce_object<T: DecodeFields + Default>(key: &str, value: &Value) -> Result<T, DecodeError> {
    let map = value
        .as_map()
        .ok_or_else(|| mismatch(key.to_string(), "map", value))?;
    let mut out = T::default();
    out.decode_fields(&Fields::nested(map, key.to_string()))?;
    Ok(out)
}

impl<'a> Fields<'a> {
    /// View the top level of a payload.
    pub fn new(map: &'a BTreeMap<String, Value>) -> Self {
        Self {
            map,
            prefix: String::new(),
        }
    }

    fn nested(map: &'a BTreeMap<String, Value>, prefix: String) -> Self {
        Self { map, prefix }
    }

    /// Find a field, returning the key as written in the payload along with
    /// its value. `null` values are reported as absent.
    fn lookup(&self, name: &str) -> Option<(String, &'a Value)> {
        let (key, value) = find_ignore_case(self.map, name)?;
        if value.is_null() {
            return None;
        }
        let full = if self.prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", self.prefix, key)
        };
        Some((full, value))
    }

    pub fn string(&self, name: &str, out: &mut String) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            *out = coerce_string(&key, value)?;
        }
        Ok(())
    }

    pub fn bool(&self, name: &str, out: &mut bool) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            *out = match value {
                Value::Bool(b) => *b,
                other => return Err(mismatch(key, "bool", other)),
            };
        }
        Ok(())
    }

    /// Unsigned integer. Non-negative floats are truncated.
    pub fn uint(&self, name: &str, out: &mut u64) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            *out = match value {
                Value::Integer(i) if *i >= 0 => *i as u64,
                Value::Float(f) if f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64 => {
                    *f as u64
                }
                other => return Err(mismatch(key, "uint", other)),
            };
        }
        Ok(())
    }

    pub fn float(&self, name: &str, out: &mut f32) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            *out = match value {
                Value::Integer(i) => *i as f32,
                Value::Float(f) => *f as f32,
                other => return Err(mismatch(key, "float", other)),
            };
        }
        Ok(())
    }

    /// Duration: a count of nanoseconds, or a string like `"10s"`/`"2h30m"`.
    pub fn duration(&self, name: &str, out: &mut Duration) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            *out = match value {
                Value::Integer(i) if *i >= 0 => Duration::from_nanos(*i as u64),
                Value::Float(f) if f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64 => {
                    Duration::from_nanos(*f as u64)
                }
                Value::String(s) => {
                    parse_duration(s).map_err(|source| DecodeError::Duration { key, source })?
                }
                other => return Err(mismatch(key, "duration", other)),
            };
        }
        Ok(())
    }

    /// A list of strings. A lone string is not promoted to a list.
    pub fn strings(&self, name: &str, out: &mut Vec<String>) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            let Value::Array(items) = value else {
                return Err(mismatch(key, "array", value));
            };
            *out = items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_string(&format!("{}[{}]", key, i), item))
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }

    /// A free-form map kept as untyped values.
    pub fn values(
        &self,
        name: &str,
        out: &mut BTreeMap<String, Value>,
    ) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            let map = value.as_map().ok_or_else(|| mismatch(key, "map", value))?;
            *out = map.clone();
        }
        Ok(())
    }

    /// A nested structure, decoded into the existing target.
    pub fn object<T: DecodeFields>(&self, name: &str, out: &mut T) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            let map = value
                .as_map()
                .ok_or_else(|| mismatch(key.clone(), "map", value))?;
            out.decode_fields(&Fields::nested(map, key))?;
        }
        Ok(())
    }

    /// An optional nested structure; set only when the key is present.
    pub fn optional<T: DecodeFields + Default>(
        &self,
        name: &str,
        out: &mut Option<T>,
    ) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            *out = Some(coerce_object(&key, value)?);
        }
        Ok(())
    }

    /// A map of nested structures keyed by arbitrary strings.
    pub fn object_map<T: DecodeFields + Default>(
        &self,
        name: &str,
        out: &mut BTreeMap<String, T>,
    ) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            let map = value.as_map().ok_or_else(|| mismatch(key.clone(), "map", value))?;
            let mut decoded = BTreeMap::new();
            for (item_key, item) in map {
                let path = format!("{}.{}", key, item_key);
                decoded.insert(item_key.clone(), coerce_object(&path, item)?);
            }
            *out = decoded;
        }
        Ok(())
    }

    /// A list of nested structures.
    pub fn object_list<T: DecodeFields + Default>(
        &self,
        name: &str,
        out: &mut Vec<T>,
    ) -> Result<(), DecodeError> {
        if let Some((key, value)) = self.lookup(name) {
            let Value::Array(items) = value else {
                return Err(mismatch(key, "array", value));
            };
            *out = items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_object(&format!("{}[{}]", key, i), item))
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }
}

/// Turns untyped payloads into typed entries using a [`KindRegistry`].
#[derive(Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r KindRegistry,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r KindRegistry) -> Self {
        Self { registry }
    }

    /// Decode a payload into a typed entry.
    ///
    /// # Errors
    ///
    /// - `NotAnObject` if `raw` is neither a map nor `null`
    /// - `MissingKind` if neither `Kind` nor `kind` is present
    /// - `InvalidKindType` if the discriminator is not a string
    /// - `UnknownKind` if the registry does not know the kind
    /// - `Mismatch`/`Duration` for the first field that cannot be coerced
    pub fn decode(&self, raw: &Value) -> Result<ConfigEntry, DecodeError> {
        let empty = BTreeMap::new();
        let map = match raw {
            Value::Null => &empty,
            other => other.as_map().ok_or(DecodeError::NotAnObject {
                actual: other.type_name(),
            })?,
        };

        let kind_value = map
            .get("Kind")
            .or_else(|| map.get("kind"))
            .ok_or(DecodeError::MissingKind)?;
        let kind = kind_value.as_str().ok_or(DecodeError::InvalidKindType {
            actual: kind_value.type_name(),
        })?;

        let mut entry = self.registry.resolve(kind, "")?;
        entry.decode_fields(&Fields::new(map))?;
        Ok(entry)
    }
}

/// Decode a payload with the built-in kind registry.
pub fn decode_entry(raw: &Value) -> Result<ConfigEntry, DecodeError> {
    Decoder::new(builtin_registry()).decode(raw)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e9f64..1.0e9).prop_map(Value::Float),
            "[a-z0-9 .]{0,12}".prop_map(Value::String),
        ]
    }

    fn any_value() -> impl Strategy<Value = Value> {
        scalar().prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[A-Za-z]{1,10}", inner, 0..4).prop_map(Value::Map),
            ]
        })
    }

    /// Top-level maps whose keys never spell a discriminator.
    fn map_without_kind() -> impl Strategy<Value = BTreeMap<String, Value>> {
        prop::collection::btree_map(
            "[A-Za-z]{1,10}".prop_filter("discriminator key", |k| k != "Kind" && k != "kind"),
            any_value(),
            0..6,
        )
    }

    fn non_string_value() -> impl Strategy<Value = Value> {
        any_value().prop_filter("string discriminator", |v| !matches!(v, Value::String(_)))
    }

    fn builtin_kind() -> impl Strategy<Value = &'static str> {
        prop::sample::select(builtin_registry().kinds().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn prop_no_discriminator_is_missing_kind(map in map_without_kind()) {
            prop_assert_eq!(decode_entry(&Value::Map(map)), Err(DecodeError::MissingKind));
        }

        #[test]
        fn prop_non_string_discriminator_is_invalid(
            map in map_without_kind(),
            kind in non_string_value(),
            lowercase in any::<bool>(),
        ) {
            let mut map = map;
            let key = if lowercase { "kind" } else { "Kind" };
            let actual = kind.type_name();
            map.insert(key.to_string(), kind);
            prop_assert_eq!(
                decode_entry(&Value::Map(map)),
                Err(DecodeError::InvalidKindType { actual })
            );
        }

        /// Decoding never panics, and decoding the same payload twice agrees.
        #[test]
        fn prop_decode_is_idempotent(
            map in map_without_kind(),
            kind in builtin_kind(),
            name in "[a-z-]{0,10}",
        ) {
            let mut map = map;
            map.insert("Kind".to_string(), Value::from(kind));
            map.insert("Name".to_string(), Value::from(name));
            let raw = Value::Map(map);

            let first = decode_entry(&raw);
            let second = decode_entry(&raw);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_decode_any_value_is_total(raw in any_value()) {
            let _ = decode_entry(&raw);
        }
    }
}
