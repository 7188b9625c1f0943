//! The backend calls carried over HTTP.
//!
//! Each call is a `POST {base}/rpc/{verb}` whose body is the JSON envelope.
//! A 2xx reply carries the JSON result (empty for writes), 403 means the
//! token was refused, and any other status carries the store's error text.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use confentry_core::{
    Backend, BackendError, ConfigEntryQuery, ConfigEntryRequest, IndexedConfigEntries, RpcVerb,
};

use crate::error::Error;
use crate::executor::{HttpExecutor, ReqwestExecutor};
use crate::types::{HttpRequest, HttpResponse, Method};

/// Path segment under which the verbs are served.
pub const RPC_PATH: &str = "rpc";

/// A [`Backend`] that forwards every call to a remote store over HTTP.
pub struct HttpRpcBackend<E = ReqwestExecutor> {
    base_url: Url,
    executor: E,
}

impl HttpRpcBackend<ReqwestExecutor> {
    /// Connect to `base_url` with the default 30 second timeout.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let executor =
            ReqwestExecutor::with_default_timeout().map_err(|message| Error::Client { message })?;
        Self::with_executor(base_url, executor)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let executor = ReqwestExecutor::new(timeout).map_err(|message| Error::Client { message })?;
        Self::with_executor(base_url, executor)
    }
}

impl<E: HttpExecutor> HttpRpcBackend<E> {
    pub fn with_executor(base_url: &str, executor: E) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, executor })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for a verb.
    pub fn verb_url(&self, verb: RpcVerb) -> Result<Url, BackendError> {
        self.base_url
            .join(&format!("{}/{}", RPC_PATH, verb))
            .map_err(BackendError::transport)
    }

    fn call(&self, verb: RpcVerb, args: &impl Serialize) -> Result<HttpResponse, BackendError> {
        let url = self.verb_url(verb)?;
        let body = serde_json::to_string(args).map_err(BackendError::transport)?;
        let request = HttpRequest::post(url.as_str()).with_raw_body(body);

        tracing::debug!(verb = %verb, url = %url, "rpc call");
        let response = self
            .executor
            .execute(&request)
            .map_err(BackendError::transport)?;

        match response.status {
            200..=299 => Ok(response),
            403 => Err(BackendError::PermissionDenied),
            status => {
                let message = response.body_str().trim();
                tracing::debug!(verb = %verb, status, error = message, "rpc error");
                if message.is_empty() {
                    Err(BackendError::rpc(response.status_text.clone()))
                } else {
                    Err(BackendError::rpc(message))
                }
            }
        }
    }

    fn read<T: DeserializeOwned>(&self, verb: RpcVerb, args: &impl Serialize) -> Result<T, BackendError> {
        let response = self.call(verb, args)?;
        serde_json::from_str(response.body_str()).map_err(BackendError::transport)
    }
}

impl<E: HttpExecutor> Backend for HttpRpcBackend<E> {
    fn get(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        self.read(RpcVerb::Get, query)
    }

    fn list(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        self.read(RpcVerb::List, query)
    }

    fn delete(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.call(RpcVerb::Delete, request).map(|_| ())
    }

    fn apply(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.call(RpcVerb::Apply, request).map(|_| ())
    }
}

/// The serving side: answers `POST {prefix}/rpc/{verb}` from a local backend.
pub struct RpcService<B> {
    backend: B,
    prefix: String,
}

impl<B: Backend> RpcService<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            prefix: format!("/{}/", RPC_PATH),
        }
    }

    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let Some(verb) = request
            .path
            .strip_prefix(&self.prefix)
            .and_then(RpcVerb::parse)
        else {
            return HttpResponse::text(404, "Unknown RPC");
        };
        if request.method != Method::POST {
            return Error::MethodNotAllowed {
                method: request.method,
                allowed: vec![Method::POST],
            }
            .into_response();
        }

        self.dispatch(verb, request.body_bytes())
            .unwrap_or_else(Error::into_response)
    }

    fn dispatch(&self, verb: RpcVerb, body: &[u8]) -> Result<HttpResponse, Error> {
        match verb {
            RpcVerb::Get => Ok(HttpResponse::json(200, &self.backend.get(&decode(body)?)?)?),
            RpcVerb::List => Ok(HttpResponse::json(200, &self.backend.list(&decode(body)?)?)?),
            RpcVerb::Delete => {
                self.backend.delete(&decode(body)?)?;
                Ok(HttpResponse::new(200))
            }
            RpcVerb::Apply => {
                self.backend.apply(&decode(body)?)?;
                Ok(HttpResponse::new(200))
            }
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| Error::bad_request(e.to_string()))
}
