use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::Error;

/// HTTP method for requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
    TRACE,
    CONNECT,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::PATCH => http::Method::PATCH,
            Method::HEAD => http::Method::HEAD,
            Method::OPTIONS => http::Method::OPTIONS,
            Method::TRACE => http::Method::TRACE,
            Method::CONNECT => http::Method::CONNECT,
        }
    }
}

/// Extension verbs have no `Method` and are refused.
impl TryFrom<http::Method> for Method {
    type Error = Error;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        match method {
            http::Method::GET => Ok(Method::GET),
            http::Method::POST => Ok(Method::POST),
            http::Method::PUT => Ok(Method::PUT),
            http::Method::DELETE => Ok(Method::DELETE),
            http::Method::PATCH => Ok(Method::PATCH),
            http::Method::HEAD => Ok(Method::HEAD),
            http::Method::OPTIONS => Ok(Method::OPTIONS),
            http::Method::TRACE => Ok(Method::TRACE),
            http::Method::CONNECT => Ok(Method::CONNECT),
            other => Err(Error::UnknownMethod {
                method: other.to_string(),
            }),
        }
    }
}

/// An HTTP request, either inbound to the config endpoint or outbound to
/// the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpRequest {
    /// HTTP method (GET, PUT, DELETE, etc.)
    #[serde(default)]
    pub method: Method,

    /// URL path for inbound requests; full URL for outbound ones.
    #[serde(default)]
    pub path: String,

    /// Query parameters. Flags without a value map to an empty string.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query: HashMap<String, String>,

    /// Request headers
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Raw request body, usually JSON text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: impl Serialize) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_string(&body)?);
        Ok(self)
    }

    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Look up a header, ignoring ASCII case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Body bytes; empty when there is no body.
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default().as_bytes()
    }
}

/// HTTP response from a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body as JSON value
    /// Will be null if body was empty or not valid JSON
    pub body: serde_json::Value,

    /// Raw body as string (useful when body isn't JSON)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
}

impl HttpResponse {
    /// An empty response with the given status.
    pub fn new(status: u16) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();
        Self {
            status,
            status_text,
            headers: HashMap::new(),
            body: serde_json::Value::Null,
            body_text: None,
        }
    }

    /// A response carrying a JSON body.
    pub fn json(status: u16, body: &impl Serialize) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_value(body)?;
        let body_text = body.to_string();
        Ok(Self {
            body,
            body_text: Some(body_text),
            ..Self::new(status)
        }
        .with_header("Content-Type", "application/json"))
    }

    /// A response carrying a plain-text body.
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            body_text: Some(message.into()),
            ..Self::new(status)
        }
        .with_header("Content-Type", "text/plain; charset=utf-8")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Look up a header, ignoring ASCII case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The raw body, or an empty string.
    pub fn body_str(&self) -> &str {
        self.body_text.as_deref().unwrap_or_default()
    }

    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Try to deserialize the body into a specific type
    pub fn json_body<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names() {
        assert_eq!(Method::DELETE.to_string(), "DELETE");
        assert_eq!(http::Method::from(Method::PUT), http::Method::PUT);
        assert_eq!(Method::try_from(http::Method::DELETE).unwrap(), Method::DELETE);
        assert_eq!(Method::try_from(http::Method::TRACE).unwrap(), Method::TRACE);
    }

    #[test]
    fn extension_methods_are_refused() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        let err = Method::try_from(purge).unwrap_err();
        assert_eq!(err.status(), 405);
        assert_eq!(err.to_string(), "Method PURGE not allowed");
    }

    #[test]
    fn request_header_lookup_ignores_case() {
        let request = HttpRequest::get("/v1/config/x").with_header("x-config-token", "abc");
        assert_eq!(request.header("X-Config-Token"), Some("abc"));
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn request_body_bytes() {
        assert!(HttpRequest::put("/v1/config").body_bytes().is_empty());
        let request = HttpRequest::put("/v1/config")
            .with_body(serde_json::json!({"Kind": "proxy-defaults"}))
            .unwrap();
        assert_eq!(request.body_bytes(), br#"{"Kind":"proxy-defaults"}"#);
    }

    #[test]
    fn response_constructors() {
        let text = HttpResponse::text(400, "bad");
        assert_eq!(text.status_text, "Bad Request");
        assert_eq!(text.body_str(), "bad");
        assert!(text.is_client_error());
        assert_eq!(text.body, serde_json::Value::Null);

        let json = HttpResponse::json(200, &serde_json::json!({})).unwrap();
        assert!(json.is_success());
        assert_eq!(json.body_str(), "{}");
        assert_eq!(json.header("content-type"), Some("application/json"));

        assert_eq!(HttpResponse::new(599).status_text, "Unknown");
        assert!(HttpResponse::new(500).is_server_error());
    }
}
