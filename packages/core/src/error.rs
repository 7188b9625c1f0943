//! Error types for the core layer.
//!
//! `DecodeError` and `PathError` describe malformed requests and are always
//! detected before a backend call is issued. `BackendError` is whatever the
//! store reported; callers surface it without reclassifying it.

use thiserror::Error;

/// Errors from the duration grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration \"{0}\"")]
    Invalid(String),

    #[error("missing unit in duration \"{0}\"")]
    MissingUnit(String),

    #[error("unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit { unit: String, input: String },

    #[error("negative durations are not supported: \"{0}\"")]
    Negative(String),
}

/// Errors turning an untyped payload into a typed entry.
///
/// Decoding stops at the first failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The payload is not a map at the top level.
    #[error("payload must be an object, got {actual}")]
    NotAnObject { actual: &'static str },

    /// Neither `Kind` nor `kind` is present.
    #[error("Payload does not contain a kind/Kind key at the top level")]
    MissingKind,

    /// The discriminator exists but is not a string.
    #[error("Kind value in payload is not a string")]
    InvalidKindType { actual: &'static str },

    /// The discriminator names no registered kind.
    #[error("invalid config entry kind: {kind}")]
    UnknownKind { kind: String },

    /// A field value cannot be coerced onto the target shape.
    #[error("'{key}' expected type '{expected}', got unconvertible type '{actual}'")]
    Mismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A duration string did not parse.
    #[error("error decoding '{key}': {source}")]
    Duration {
        key: String,
        #[source]
        source: DurationError,
    },
}

impl DecodeError {
    /// The offending key for field-level failures.
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::Mismatch { key, .. } | DecodeError::Duration { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Cardinality errors from the path resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Must provide either a kind or both kind and name")]
    KindOrKindAndName,

    #[error("Must provide both a kind and name to delete")]
    KindAndNameForDelete,
}

/// Errors reported by the authoritative store.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The call never reached the store, or its reply could not be read.
    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The store rejected the caller's token.
    #[error("Permission denied")]
    PermissionDenied,

    /// The store's own error, carried verbatim.
    #[error("{message}")]
    Rpc { message: String },
}

impl BackendError {
    /// Build an `Rpc` error from a message.
    pub fn rpc(message: impl Into<String>) -> Self {
        BackendError::Rpc {
            message: message.into(),
        }
    }

    /// Wrap any error as a transport failure.
    pub fn transport(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        BackendError::Transport(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn decode_error_messages() {
        assert_eq!(
            DecodeError::MissingKind.to_string(),
            "Payload does not contain a kind/Kind key at the top level"
        );
        assert_eq!(
            DecodeError::InvalidKindType { actual: "integer" }.to_string(),
            "Kind value in payload is not a string"
        );
        assert_eq!(
            DecodeError::UnknownKind {
                kind: "web".to_string()
            }
            .to_string(),
            "invalid config entry kind: web"
        );
    }

    #[test]
    fn mismatch_display_names_key_and_types() {
        let e = DecodeError::Mismatch {
            key: "MeshGateway".to_string(),
            expected: "map",
            actual: "string",
        };
        let display = e.to_string();
        assert!(display.contains("'MeshGateway'"));
        assert!(display.contains("'map'"));
        assert!(display.contains("'string'"));
        assert_eq!(e.key(), Some("MeshGateway"));
    }

    #[test]
    fn duration_decode_error_has_source() {
        let e = DecodeError::Duration {
            key: "ConnectTimeout".to_string(),
            source: DurationError::Invalid("abc".to_string()),
        };
        assert!(e.to_string().contains("ConnectTimeout"));
        assert!(e.to_string().contains("invalid duration \"abc\""));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn path_error_messages() {
        assert_eq!(
            PathError::KindOrKindAndName.to_string(),
            "Must provide either a kind or both kind and name"
        );
        assert_eq!(
            PathError::KindAndNameForDelete.to_string(),
            "Must provide both a kind and name to delete"
        );
    }

    #[test]
    fn backend_error_rpc_is_verbatim() {
        let e = BackendError::rpc("No path to datacenter");
        assert_eq!(e.to_string(), "No path to datacenter");
    }

    #[test]
    fn backend_transport_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e = BackendError::transport(io);
        assert!(e.to_string().starts_with("transport error"));
        assert!(e.to_string().contains("refused"));
    }
}
