//! Kind identifier -> entry constructor lookup.

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::{
    ConfigEntry, DecodeError, ProxyConfigEntry, ServiceConfigEntry, ServiceResolverConfigEntry,
    ServiceSplitterConfigEntry, PROXY_DEFAULTS, SERVICE_DEFAULTS, SERVICE_RESOLVER,
    SERVICE_SPLITTER,
};

/// Builds a zero-valued entry carrying the given name.
pub type EntryConstructor = fn(&str) -> ConfigEntry;

/// Maps kind identifiers to constructors.
///
/// Kinds are matched exactly; case handling of the discriminator *key*
/// happens in the decoder, not here. A registry is read-only once built, so
/// a shared reference can be used from any number of threads.
#[derive(Clone, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<&'static str, EntryConstructor>,
}

impl KindRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(SERVICE_DEFAULTS, |name| {
            ConfigEntry::ServiceDefaults(ServiceConfigEntry {
                name: name.to_string(),
                ..Default::default()
            })
        });
        registry.register(PROXY_DEFAULTS, |name| {
            ConfigEntry::ProxyDefaults(ProxyConfigEntry {
                name: name.to_string(),
                ..Default::default()
            })
        });
        registry.register(SERVICE_RESOLVER, |name| {
            ConfigEntry::ServiceResolver(ServiceResolverConfigEntry {
                name: name.to_string(),
                ..Default::default()
            })
        });
        registry.register(SERVICE_SPLITTER, |name| {
            ConfigEntry::ServiceSplitter(ServiceSplitterConfigEntry {
                name: name.to_string(),
                ..Default::default()
            })
        });
        registry
    }

    /// Register (or replace) the constructor for a kind.
    pub fn register(&mut self, kind: &'static str, constructor: EntryConstructor) {
        self.kinds.insert(kind, constructor);
    }

    /// Build a fresh entry of `kind` named `name`.
    pub fn resolve(&self, kind: &str, name: &str) -> Result<ConfigEntry, DecodeError> {
        let constructor = self
            .kinds
            .get(kind)
            .ok_or_else(|| DecodeError::UnknownKind {
                kind: kind.to_string(),
            })?;
        Ok(constructor(name))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }
}

lazy_static! {
    static ref BUILTIN: KindRegistry = KindRegistry::builtin();
}

/// The process-wide registry of built-in kinds.
pub fn builtin_registry() -> &'static KindRegistry {
    &BUILTIN
}

/// Build a zero-valued entry of a built-in kind.
pub fn make_config_entry(kind: &str, name: &str) -> Result<ConfigEntry, DecodeError> {
    builtin_registry().resolve(kind, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kinds_resolve_with_name() {
        for kind in [
            SERVICE_DEFAULTS,
            PROXY_DEFAULTS,
            SERVICE_RESOLVER,
            SERVICE_SPLITTER,
        ] {
            let entry = make_config_entry(kind, "web").unwrap();
            assert_eq!(entry.kind(), kind);
            assert_eq!(entry.name(), "web");
            assert_eq!(entry.modify_index(), 0);
        }
    }

    #[test]
    fn resolved_entries_are_zero_valued() {
        let entry = make_config_entry(SERVICE_DEFAULTS, "").unwrap();
        assert_eq!(
            entry,
            ConfigEntry::ServiceDefaults(ServiceConfigEntry::default())
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = make_config_entry("web", "api").unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownKind {
                kind: "web".to_string()
            }
        );
        assert!(make_config_entry("", "api").is_err());
        assert!(make_config_entry("SERVICE-DEFAULTS", "api").is_err());
    }

    #[test]
    fn kinds_are_listed_sorted() {
        let kinds: Vec<_> = builtin_registry().kinds().collect();
        assert_eq!(
            kinds,
            vec![
                PROXY_DEFAULTS,
                SERVICE_DEFAULTS,
                SERVICE_RESOLVER,
                SERVICE_SPLITTER
            ]
        );
        assert!(builtin_registry().contains(SERVICE_RESOLVER));
        assert!(!builtin_registry().contains("service-router"));
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let registry = KindRegistry::new();
        assert!(registry.resolve(SERVICE_DEFAULTS, "web").is_err());
        assert_eq!(registry.kinds().count(), 0);
    }

    #[test]
    fn builtin_registry_is_shareable_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let name = format!("svc-{}", i);
                    make_config_entry(SERVICE_RESOLVER, &name).unwrap().name().to_string()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("svc-{}", i));
        }
    }
}
