//! Endpoint configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFIX: &str = "/v1/config";
pub const DEFAULT_DATACENTER: &str = "dc1";

/// Where the endpoint is mounted and what it assumes when a request is
/// silent about datacenter or token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Apply lives at `prefix`; reads and deletes under `prefix/`.
    pub prefix: String,
    /// Datacenter used when a request carries no `?dc=`.
    pub datacenter: String,
    /// Token used when a request carries none.
    pub token: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            datacenter: DEFAULT_DATACENTER.to_string(),
            token: String::new(),
        }
    }
}

impl EndpointConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = datacenter.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// The prefix that read and delete paths start with.
    pub fn entry_prefix(&self) -> String {
        format!("{}/", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.prefix, "/v1/config");
        assert_eq!(config.entry_prefix(), "/v1/config/");
        assert_eq!(config.datacenter, "dc1");
        assert!(config.token.is_empty());
    }

    #[test]
    fn prefix_trailing_slash_is_dropped() {
        let config = EndpointConfig::default().with_prefix("/api/config/");
        assert_eq!(config.prefix, "/api/config");
        assert_eq!(config.entry_prefix(), "/api/config/");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EndpointConfig = serde_json::from_str(r#"{"token": "root"}"#).unwrap();
        assert_eq!(config.token, "root");
        assert_eq!(config.prefix, DEFAULT_PREFIX);
    }
}
