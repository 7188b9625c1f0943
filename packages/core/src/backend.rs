//! The authoritative store, seen as four opaque calls.

use std::fmt;
use std::sync::Arc;

use crate::{BackendError, ConfigEntryQuery, ConfigEntryRequest, IndexedConfigEntries};

/// Names of the calls issued to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcVerb {
    Get,
    List,
    Delete,
    Apply,
}

impl RpcVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcVerb::Get => "ConfigEntry.Get",
            RpcVerb::List => "ConfigEntry.List",
            RpcVerb::Delete => "ConfigEntry.Delete",
            RpcVerb::Apply => "ConfigEntry.Apply",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ConfigEntry.Get" => Some(RpcVerb::Get),
            "ConfigEntry.List" => Some(RpcVerb::List),
            "ConfigEntry.Delete" => Some(RpcVerb::Delete),
            "ConfigEntry.Apply" => Some(RpcVerb::Apply),
            _ => None,
        }
    }
}

impl fmt::Display for RpcVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The store behind the gateway.
///
/// Each method is one blocking call. Implementations own their consistency,
/// timeout and cancellation policy; callers never retry.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Backend>`.
pub trait Backend: Send + Sync {
    /// `ConfigEntry.Get`: zero or one entry named `query.name`.
    fn get(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError>;

    /// `ConfigEntry.List`: every entry of `query.kind`.
    fn list(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError>;

    /// `ConfigEntry.Delete`
    fn delete(&self, request: &ConfigEntryRequest) -> Result<(), BackendError>;

    /// `ConfigEntry.Apply`
    fn apply(&self, request: &ConfigEntryRequest) -> Result<(), BackendError>;
}

// Blanket implementations for references and smart pointers

impl<T: Backend + ?Sized> Backend for &T {
    fn get(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        (**self).get(query)
    }

    fn list(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        (**self).list(query)
    }

    fn delete(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        (**self).delete(request)
    }

    fn apply(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        (**self).apply(request)
    }
}

impl<T: Backend + ?Sized> Backend for Box<T> {
    fn get(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        self.as_ref().get(query)
    }

    fn list(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        self.as_ref().list(query)
    }

    fn delete(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.as_ref().delete(request)
    }

    fn apply(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.as_ref().apply(request)
    }
}

impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn get(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        self.as_ref().get(query)
    }

    fn list(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        self.as_ref().list(query)
    }

    fn delete(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.as_ref().delete(request)
    }

    fn apply(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.as_ref().apply(request)
    }
}
