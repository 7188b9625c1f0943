//! Client configuration.
//!
//! Layers, lowest first: built-in defaults, the JSON config file, the
//! environment, then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use confentry_core::duration::serde_duration;
use confentry_core::parse_duration;

use crate::error::CliError;

pub const ENV_HTTP_ADDR: &str = "CONFENTRY_HTTP_ADDR";
pub const ENV_DATACENTER: &str = "CONFENTRY_DATACENTER";
pub const ENV_TOKEN: &str = "CONFENTRY_TOKEN";
pub const ENV_TIMEOUT: &str = "CONFENTRY_TIMEOUT";

pub const DEFAULT_HTTP_ADDR: &str = "http://127.0.0.1:8300";

/// Where the client sends requests and with what credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ClientConfig {
    /// Base URL of the RPC server.
    pub http_addr: String,
    /// Empty means the server's own datacenter.
    pub datacenter: String,
    pub token: String,
    #[serde(with = "serde_duration")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            datacenter: String::new(),
            token: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub http_addr: Option<String>,
    pub datacenter: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<String>,
}

/// `<config dir>/confentry/config.json`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("confentry").join("config.json"))
}

impl ClientConfig {
    /// Build the effective configuration.
    ///
    /// `env` looks up environment variables; pass `|k| std::env::var(k).ok()`
    /// outside of tests. A missing default config file is not an error; a
    /// missing file named by `--config` is.
    pub fn load(
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CliError> {
        let mut config = match &overrides.config_file {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(env)?;
        config.apply_overrides(overrides)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| CliError::ConfigFile {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), CliError> {
        if let Some(addr) = env(ENV_HTTP_ADDR) {
            self.http_addr = addr;
        }
        if let Some(dc) = env(ENV_DATACENTER) {
            self.datacenter = dc;
        }
        if let Some(token) = env(ENV_TOKEN) {
            self.token = token;
        }
        if let Some(timeout) = env(ENV_TIMEOUT) {
            self.timeout = parse_timeout(ENV_TIMEOUT, &timeout)?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), CliError> {
        if let Some(addr) = &overrides.http_addr {
            self.http_addr = addr.clone();
        }
        if let Some(dc) = &overrides.datacenter {
            self.datacenter = dc.clone();
        }
        if let Some(token) = &overrides.token {
            self.token = token.clone();
        }
        if let Some(timeout) = &overrides.timeout {
            self.timeout = parse_timeout("--timeout", timeout)?;
        }
        Ok(())
    }
}

fn parse_timeout(name: &str, value: &str) -> Result<Duration, CliError> {
    parse_duration(value).map_err(|source| CliError::Duration {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_layer_keeps_defaults_for_missing_keys() {
        let file = config_file(r#"{"datacenter": "east", "timeout": "5s"}"#);
        let overrides = Overrides {
            config_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = ClientConfig::load(&overrides, env_from(&[])).unwrap();
        assert_eq!(config.datacenter, "east");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.http_addr, DEFAULT_HTTP_ADDR);
    }

    #[test]
    fn env_beats_file_and_flags_beat_env() {
        let file = config_file(r#"{"datacenter": "east", "token": "file-token"}"#);
        let overrides = Overrides {
            config_file: Some(file.path().to_path_buf()),
            token: Some("flag-token".to_string()),
            ..Default::default()
        };
        let env = env_from(&[
            (ENV_DATACENTER, "west"),
            (ENV_TOKEN, "env-token"),
            (ENV_TIMEOUT, "1m"),
        ]);

        let config = ClientConfig::load(&overrides, env).unwrap();
        assert_eq!(config.datacenter, "west");
        assert_eq!(config.token, "flag-token");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn bad_timeout_names_its_source() {
        let overrides = Overrides {
            timeout: Some("soon".to_string()),
            ..Default::default()
        };
        let file = config_file("{}");
        let overrides = Overrides {
            config_file: Some(file.path().to_path_buf()),
            ..overrides
        };

        let err = ClientConfig::load(&overrides, env_from(&[])).unwrap_err();
        assert!(err.to_string().starts_with("Invalid --timeout"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let file = config_file("{ not json");
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CliError::ConfigFile { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            config_file: Some(dir.path().join("absent.json")),
            ..Default::default()
        };
        assert!(matches!(
            ClientConfig::load(&overrides, env_from(&[])),
            Err(CliError::Io(_))
        ));
    }
}
