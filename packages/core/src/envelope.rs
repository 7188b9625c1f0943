//! Request, query and reply envelopes exchanged with the backend.
//!
//! Envelopes are built fresh for each inbound request and dropped once the
//! backend call returns.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::serde_duration;
use crate::ConfigEntry;

/// The write operation carried by a [`ConfigEntryRequest`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigEntryOp {
    #[default]
    Upsert,
    Delete,
}

/// A write against the store: an entry plus routing and auth metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigEntryRequest {
    #[serde(default)]
    pub op: ConfigEntryOp,
    #[serde(default)]
    pub datacenter: String,
    pub entry: ConfigEntry,
    /// Opaque credential; passed through untouched.
    #[serde(default)]
    pub token: String,
}

impl ConfigEntryRequest {
    pub fn upsert(entry: ConfigEntry) -> Self {
        Self {
            op: ConfigEntryOp::Upsert,
            datacenter: String::new(),
            entry,
            token: String::new(),
        }
    }

    pub fn delete(entry: ConfigEntry) -> Self {
        Self {
            op: ConfigEntryOp::Delete,
            ..Self::upsert(entry)
        }
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = datacenter.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

/// Read options forwarded to the store as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryOptions {
    pub token: String,
    /// Block until the store's index exceeds this value.
    pub min_query_index: u64,
    /// Upper bound on blocking when `min_query_index` is set.
    #[serde(with = "serde_duration")]
    pub max_query_time: Duration,
    pub allow_stale: bool,
    pub require_consistent: bool,
}

/// A read against the store. `name` is empty for list queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConfigEntryQuery {
    pub kind: String,
    pub name: String,
    pub datacenter: String,
    pub query_options: QueryOptions,
}

impl ConfigEntryQuery {
    pub fn list(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn single(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = datacenter.into();
        self
    }
}

/// Metadata about the store state a reply was served from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryMeta {
    pub index: u64,
    pub known_leader: bool,
}

/// Reply to both single-entry and list reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexedConfigEntries {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub entries: Vec<ConfigEntry>,
    #[serde(flatten)]
    pub query_meta: QueryMeta,
}
