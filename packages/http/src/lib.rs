//! # confentry-http
//!
//! The HTTP face of the config-entry gateway.
//!
//! ## ConfigEndpoint
//!
//! The CRUD dispatcher. It takes an [`HttpRequest`], resolves the path and
//! body, issues one call on a [`Backend`](confentry_core::Backend) and
//! renders the outcome as an [`HttpResponse`]:
//!
//! ```rust
//! use confentry_http::{ConfigEndpoint, HttpRequest};
//! use confentry_memory::InMemoryBackend;
//!
//! let endpoint = ConfigEndpoint::new(InMemoryBackend::default());
//! let response = endpoint.handle(&HttpRequest::put("/v1/config/service-defaults"));
//! assert_eq!(response.status, 405);
//! assert_eq!(response.header("Allow"), Some("GET, DELETE"));
//! ```
//!
//! ## HttpRpcBackend
//!
//! A `Backend` that reaches a remote store with `POST {base}/rpc/{verb}`,
//! through a swappable [`HttpExecutor`]:
//!
//! ```ignore
//! use confentry_http::{ConfigEndpoint, HttpRpcBackend};
//!
//! let backend = HttpRpcBackend::new("http://127.0.0.1:8300")?;
//! let endpoint = ConfigEndpoint::new(backend);
//! ```
//!
//! [`RpcService`] is the matching server side over any local backend.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod types;

mod rpc;

// Re-export main types
pub use config::EndpointConfig;
pub use endpoint::ConfigEndpoint;
pub use error::Error;
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use types::{HttpRequest, HttpResponse, Method};

pub use crate::rpc::{HttpRpcBackend, RpcService, RPC_PATH};
