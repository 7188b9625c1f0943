//! Core config-entry layer
//!
//! This crate holds everything the gateway needs to turn an untyped payload
//! into a typed configuration entry and to talk to an authoritative store:
//! - `Value`: the untyped tree a request body is parsed into
//! - `ConfigEntry`: the closed set of typed entry kinds
//! - `KindRegistry`: kind identifier -> zero-valued entry constructor
//! - `decode_entry`: discriminator-first decoding of a `Value` into a `ConfigEntry`
//! - `EntryPath`: `{kind}` / `{kind}/{name}` request path suffixes
//! - `Backend`: the four opaque calls issued to the store
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::time::Duration;
//! use confentry_core::{decode_entry, ConfigEntry, Value};
//!
//! let mut raw = BTreeMap::new();
//! raw.insert("kind".to_string(), Value::from("service-resolver"));
//! raw.insert("Name".to_string(), Value::from("web"));
//! raw.insert("ConnectTimeout".to_string(), Value::from("15s"));
//!
//! let entry = decode_entry(&Value::Map(raw)).unwrap();
//! match entry {
//!     ConfigEntry::ServiceResolver(resolver) => {
//!         assert_eq!(resolver.name, "web");
//!         assert_eq!(resolver.connect_timeout, Duration::from_secs(15));
//!     }
//!     other => panic!("unexpected kind {}", other.kind()),
//! }
//! ```

mod backend;
mod decode;
pub mod duration;
mod entry;
mod envelope;
mod error;
mod path;
mod registry;
mod value;

pub use backend::{Backend, RpcVerb};
pub use decode::{decode_entry, DecodeFields, Decoder, Fields};
pub use duration::{format_duration, parse_duration};
pub use entry::{
    ConfigEntry, MeshGatewayConfig, ProxyConfigEntry, ServiceConfigEntry,
    ServiceResolverConfigEntry, ServiceResolverFailover, ServiceResolverRedirect,
    ServiceResolverSubset, ServiceSplit, ServiceSplitterConfigEntry, PROXY_DEFAULTS,
    SERVICE_DEFAULTS, SERVICE_RESOLVER, SERVICE_SPLITTER,
};
pub use envelope::{
    ConfigEntryOp, ConfigEntryQuery, ConfigEntryRequest, IndexedConfigEntries, QueryMeta,
    QueryOptions,
};
pub use error::{BackendError, DecodeError, DurationError, PathError};
pub use path::{EntryPath, ReadTarget};
pub use registry::{builtin_registry, make_config_entry, EntryConstructor, KindRegistry};
pub use value::Value;
