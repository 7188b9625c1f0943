//! JSON codec for request and reply bodies.

use serde::Serialize;

use confentry_core::{decode_entry, ConfigEntry, Value};

use crate::convert::json_to_value;
use crate::Error;

/// Converts between JSON bytes and the core types.
///
/// Bodies are parsed into an untyped [`Value`] first; entries are then
/// produced by the discriminator-first decoder rather than by serde, so
/// payloads are matched case-insensitively and extra keys are ignored.
///
/// # Example
///
/// ```rust
/// use confentry_serde::{JsonCodec, Value};
///
/// let value = JsonCodec.decode(br#"{"kind": "proxy-defaults"}"#).unwrap();
/// assert!(value.is_map());
/// assert!(JsonCodec.decode(b"").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Parse a body into a `Value`. Whitespace-only bodies are `EmptyBody`.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, Error> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::EmptyBody);
        }
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(json_to_value(json))
    }

    /// Parse a body and decode it into a typed entry.
    pub fn decode_entry(&self, bytes: &[u8]) -> Result<ConfigEntry, Error> {
        let raw = self.decode(bytes)?;
        Ok(decode_entry(&raw)?)
    }

    /// Serialize any reply into JSON bytes.
    pub fn encode<T: Serialize>(&self, data: &T) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(data)?)
    }

    /// Serialize into indented JSON, for humans.
    pub fn encode_pretty<T: Serialize>(&self, data: &T) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}
