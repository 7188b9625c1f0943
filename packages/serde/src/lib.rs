//! Serde integration for config entries
//!
//! This layer connects JSON to the core types. It adds:
//! - `JsonCodec`: request bodies to `Value`, replies to JSON bytes
//! - `Value` <-> `serde_json::Value` conversions
//! - `TypedBackend`: convenience calls on any `Backend`
//!
//! # Example
//!
//! ```rust
//! use confentry_serde::JsonCodec;
//!
//! let entry = JsonCodec
//!     .decode_entry(br#"{"Kind": "service-defaults", "Name": "web", "Protocol": "http"}"#)
//!     .unwrap();
//! assert_eq!(entry.name(), "web");
//! ```

mod codec;
mod convert;
mod error;
mod typed;

pub use codec::JsonCodec;
pub use convert::{from_value, json_to_value, to_value, value_to_json};
pub use error::Error;
pub use typed::TypedBackend;

// Re-export core types for convenience
pub use confentry_core::{
    Backend, BackendError, ConfigEntry, ConfigEntryQuery, ConfigEntryRequest, DecodeError,
    IndexedConfigEntries, Value,
};
