//! confentry: a gateway for polymorphic configuration entries.
//!
//! Untyped JSON payloads come in, a `Kind` discriminator picks the entry's
//! shape, the remaining fields are decoded onto that shape, and the typed
//! entry goes to an authoritative store through one of four calls.
//!
//! ```rust
//! use confentry::http::{ConfigEndpoint, HttpRequest};
//! use confentry::memory::InMemoryBackend;
//!
//! let endpoint = ConfigEndpoint::new(InMemoryBackend::default());
//! let put = HttpRequest::put("/v1/config")
//!     .with_raw_body(r#"{"kind": "service-resolver", "Name": "web", "ConnectTimeout": "15s"}"#);
//! assert_eq!(endpoint.handle(&put).status, 200);
//!
//! let list = endpoint.handle(&HttpRequest::get("/v1/config/service-resolver"));
//! assert_eq!(list.body["Entries"][0]["ConnectTimeout"], "15s");
//! ```

pub use confentry_core::*;

pub use confentry_http as http;
pub use confentry_memory as memory;
pub use confentry_serde as serde;
