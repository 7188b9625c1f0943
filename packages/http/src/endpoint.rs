//! The CRUD dispatcher for config entries.
//!
//! Routes:
//!
//! | Path              | Method | Operation                     |
//! |-------------------|--------|-------------------------------|
//! | `{prefix}`        | PUT    | decode body, `ConfigEntry.Apply` |
//! | `{prefix}/{kind}` | GET    | `ConfigEntry.List`            |
//! | `{prefix}/{kind}/{name}` | GET | `ConfigEntry.Get`         |
//! | `{prefix}/{kind}/{name}` | DELETE | `ConfigEntry.Delete`   |
//!
//! Every request shape problem is reported before the backend is called.

use confentry_core::{
    make_config_entry, parse_duration, Backend, ConfigEntryQuery, ConfigEntryRequest, EntryPath,
    IndexedConfigEntries, QueryOptions, ReadTarget,
};
use confentry_serde::JsonCodec;

use crate::config::EndpointConfig;
use crate::error::Error;
use crate::types::{HttpRequest, HttpResponse, Method};

pub const TOKEN_HEADER: &str = "X-Config-Token";
pub const INDEX_HEADER: &str = "X-Config-Index";
pub const KNOWN_LEADER_HEADER: &str = "X-Config-KnownLeader";

/// Stateless request handler in front of a [`Backend`].
///
/// Each request turns into at most one backend call. The endpoint holds no
/// mutable state, so one instance can serve any number of threads.
///
/// # Example
///
/// ```rust
/// use confentry_http::{ConfigEndpoint, HttpRequest};
/// use confentry_memory::InMemoryBackend;
///
/// let endpoint = ConfigEndpoint::new(InMemoryBackend::default());
///
/// let put = HttpRequest::put("/v1/config")
///     .with_raw_body(r#"{"Kind": "service-defaults", "Name": "web", "Protocol": "http"}"#);
/// assert_eq!(endpoint.handle(&put).status, 200);
///
/// let get = endpoint.handle(&HttpRequest::get("/v1/config/service-defaults/web"));
/// assert_eq!(get.body["Entries"][0]["Protocol"], "http");
/// ```
pub struct ConfigEndpoint<B> {
    backend: B,
    config: EndpointConfig,
}

impl<B: Backend> ConfigEndpoint<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, EndpointConfig::default())
    }

    pub fn with_config(backend: B, config: EndpointConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Handle a request, rendering errors as responses.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let response = self
            .dispatch(request)
            .unwrap_or_else(Error::into_response);

        if response.is_server_error() {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                error = response.body_str(),
                "config request failed"
            );
        } else {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                "config request"
            );
        }
        response
    }

    /// Route a request to its operation.
    pub fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        if request.path == self.config.prefix {
            return match request.method {
                Method::PUT => self.apply(request),
                method => Err(Error::MethodNotAllowed {
                    method,
                    allowed: vec![Method::PUT],
                }),
            };
        }

        let path = EntryPath::from_request_path(&request.path, &self.config.entry_prefix())
            .ok_or(Error::NotFound)?;

        match request.method {
            Method::GET => self.get(request, path),
            Method::DELETE => self.delete(request, path),
            method => Err(Error::MethodNotAllowed {
                method,
                allowed: vec![Method::GET, Method::DELETE],
            }),
        }
    }

    /// Fetch one entry or list a kind, depending on how many segments the
    /// path has.
    pub fn get(&self, request: &HttpRequest, path: EntryPath) -> Result<HttpResponse, Error> {
        let datacenter = self.datacenter(request);
        let query_options = self.query_options(request)?;
        let target = path
            .into_read_target()
            .map_err(|e| Error::bad_request(e.to_string()))?;

        let reply = match target {
            ReadTarget::Single { kind, name } => self.backend.get(&ConfigEntryQuery {
                kind,
                name,
                datacenter,
                query_options,
            })?,
            ReadTarget::List { kind } => self.backend.list(&ConfigEntryQuery {
                kind,
                name: String::new(),
                datacenter,
                query_options,
            })?,
        };

        indexed_response(&reply)
    }

    /// Delete the entry named by a two-segment path.
    pub fn delete(&self, request: &HttpRequest, path: EntryPath) -> Result<HttpResponse, Error> {
        let (kind, name) = path
            .into_delete_target()
            .map_err(|e| Error::bad_request(e.to_string()))?;
        let entry = make_config_entry(&kind, &name).map_err(|e| Error::bad_request(e.to_string()))?;

        let request = ConfigEntryRequest::delete(entry)
            .with_datacenter(self.datacenter(request))
            .with_token(self.token(request));
        self.backend.delete(&request)?;

        Ok(HttpResponse::json(200, &serde_json::json!({}))?)
    }

    /// Decode the body into a typed entry and upsert it.
    pub fn apply(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let entry = JsonCodec
            .decode_entry(request.body_bytes())
            .map_err(|e| Error::bad_request(format!("Request decoding failed: {}", e)))?;

        let request = ConfigEntryRequest::upsert(entry)
            .with_datacenter(self.datacenter(request))
            .with_token(self.token(request));
        self.backend.apply(&request)?;

        Ok(HttpResponse::new(200))
    }

    fn datacenter(&self, request: &HttpRequest) -> String {
        match request.query_param("dc") {
            Some(dc) if !dc.is_empty() => dc.to_string(),
            _ => self.config.datacenter.clone(),
        }
    }

    /// Header, then bearer auth, then `?token=`, then the configured default.
    fn token(&self, request: &HttpRequest) -> String {
        let header = request.header(TOKEN_HEADER);
        let bearer = request
            .header("Authorization")
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(str::trim);
        let query = request.query_param("token");

        [header, bearer, query]
            .into_iter()
            .flatten()
            .find(|token| !token.is_empty())
            .unwrap_or(self.config.token.as_str())
            .to_string()
    }

    fn query_options(&self, request: &HttpRequest) -> Result<QueryOptions, Error> {
        let mut options = QueryOptions {
            token: self.token(request),
            allow_stale: request.query_param("stale").is_some(),
            require_consistent: request.query_param("consistent").is_some(),
            ..Default::default()
        };

        if options.allow_stale && options.require_consistent {
            return Err(Error::bad_request(
                "Cannot specify ?stale with ?consistent, conflicting semantics.",
            ));
        }

        if let Some(wait) = request.query_param("wait") {
            options.max_query_time =
                parse_duration(wait).map_err(|_| Error::bad_request("Invalid wait time"))?;
        }

        if let Some(index) = request.query_param("index") {
            options.min_query_index = index
                .parse()
                .map_err(|_| Error::bad_request("Invalid index"))?;
        }

        Ok(options)
    }
}

fn indexed_response(reply: &IndexedConfigEntries) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::json(200, reply)?
        .with_header(INDEX_HEADER, reply.query_meta.index.to_string())
        .with_header(
            KNOWN_LEADER_HEADER,
            reply.query_meta.known_leader.to_string(),
        ))
}
