//! Convenience calls on any backend.

use confentry_core::{
    make_config_entry, Backend, ConfigEntry, ConfigEntryQuery, ConfigEntryRequest,
};

use crate::{Error, JsonCodec};

/// Extension trait for entry-level reads and writes.
///
/// This trait is automatically implemented for all `Backend` implementations.
/// It hides envelope construction for callers that only care about entries.
///
/// # Example
///
/// ```rust,ignore
/// use confentry_serde::TypedBackend;
///
/// fn protocol_of(backend: &dyn Backend, service: &str) -> Result<String, Error> {
///     match backend.read_entry("service-defaults", service, "dc1")? {
///         Some(ConfigEntry::ServiceDefaults(e)) => Ok(e.protocol),
///         _ => Ok(String::new()),
///     }
/// }
/// ```
pub trait TypedBackend: Backend {
    /// Fetch one entry, or `None` when the store has nothing under that name.
    fn read_entry(
        &self,
        kind: &str,
        name: &str,
        datacenter: &str,
    ) -> Result<Option<ConfigEntry>, Error> {
        let query = ConfigEntryQuery::single(kind, name).with_datacenter(datacenter);
        let reply = self.get(&query)?;
        Ok(reply.entries.into_iter().next())
    }

    /// Fetch every entry of a kind.
    fn list_entries(&self, kind: &str, datacenter: &str) -> Result<Vec<ConfigEntry>, Error> {
        let query = ConfigEntryQuery::list(kind).with_datacenter(datacenter);
        Ok(self.list(&query)?.entries)
    }

    /// Create or replace an entry.
    fn upsert(&self, entry: ConfigEntry, datacenter: &str, token: &str) -> Result<(), Error> {
        let request = ConfigEntryRequest::upsert(entry)
            .with_datacenter(datacenter)
            .with_token(token);
        Ok(self.apply(&request)?)
    }

    /// Delete an entry by kind and name. The kind must be registered.
    fn remove(&self, kind: &str, name: &str, datacenter: &str, token: &str) -> Result<(), Error> {
        let entry = make_config_entry(kind, name)?;
        let request = ConfigEntryRequest::delete(entry)
            .with_datacenter(datacenter)
            .with_token(token);
        Ok(self.delete(&request)?)
    }

    /// Decode a JSON body and upsert it. Returns the decoded entry.
    fn apply_json(&self, body: &[u8], datacenter: &str, token: &str) -> Result<ConfigEntry, Error> {
        let entry = JsonCodec.decode_entry(body)?;
        self.upsert(entry.clone(), datacenter, token)?;
        Ok(entry)
    }
}

// Blanket implementation for all Backends
impl<B: Backend + ?Sized> TypedBackend for B {}
