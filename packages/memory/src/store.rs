//! Map-backed `Backend` with store-wide indexes and blocking reads.

use std::collections::BTreeMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use confentry_core::{
    Backend, BackendError, ConfigEntry, ConfigEntryOp, ConfigEntryQuery, ConfigEntryRequest,
    IndexedConfigEntries, QueryMeta, QueryOptions,
};

use crate::DEFAULT_MAX_QUERY_TIME;

/// Entries of one datacenter, keyed by (kind, name).
type Entries = BTreeMap<(String, String), ConfigEntry>;

struct State {
    index: u64,
    datacenters: BTreeMap<String, Entries>,
}

/// An authoritative config-entry store held in memory.
///
/// Requests with an empty datacenter go to the local one. Reads whose
/// `MinQueryIndex` is set block until a write moves the store index past it
/// or `MaxQueryTime` runs out.
///
/// # Example
///
/// ```rust
/// use confentry_core::{make_config_entry, Backend, ConfigEntryQuery, ConfigEntryRequest};
/// use confentry_memory::InMemoryBackend;
///
/// let backend = InMemoryBackend::new("dc1");
/// let entry = make_config_entry("service-defaults", "web").unwrap();
/// backend.apply(&ConfigEntryRequest::upsert(entry)).unwrap();
///
/// let reply = backend.get(&ConfigEntryQuery::single("service-defaults", "web")).unwrap();
/// assert_eq!(reply.entries[0].modify_index(), 1);
/// assert_eq!(reply.query_meta.index, 1);
/// ```
pub struct InMemoryBackend {
    local_datacenter: String,
    required_token: Option<String>,
    state: Mutex<State>,
    changed: Condvar,
}

impl InMemoryBackend {
    /// Create an empty store serving a single datacenter.
    pub fn new(datacenter: impl Into<String>) -> Self {
        let local_datacenter = datacenter.into();
        let mut datacenters = BTreeMap::new();
        datacenters.insert(local_datacenter.clone(), Entries::new());
        Self {
            local_datacenter,
            required_token: None,
            state: Mutex::new(State {
                index: 0,
                datacenters,
            }),
            changed: Condvar::new(),
        }
    }

    /// Also serve another datacenter.
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.datacenters.entry(datacenter.into()).or_default();
        }
        self
    }

    /// Reject every call whose token differs from `token`.
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    pub fn local_datacenter(&self) -> &str {
        &self.local_datacenter
    }

    /// The current store-wide index.
    pub fn index(&self) -> Result<u64, BackendError> {
        Ok(self.lock()?.index)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, BackendError> {
        self.state.lock().map_err(lock_error)
    }

    fn check_token(&self, token: &str) -> Result<(), BackendError> {
        match &self.required_token {
            Some(required) if required != token => {
                log::warn!("Rejecting call with an unknown token");
                Err(BackendError::PermissionDenied)
            }
            _ => Ok(()),
        }
    }

    fn resolve_datacenter<'a>(&'a self, datacenter: &'a str) -> &'a str {
        if datacenter.is_empty() {
            &self.local_datacenter
        } else {
            datacenter
        }
    }

    /// Block until the index passes `MinQueryIndex` or the wait runs out.
    fn wait_for_change<'a>(
        &self,
        mut state: MutexGuard<'a, State>,
        options: &QueryOptions,
    ) -> Result<MutexGuard<'a, State>, BackendError> {
        if options.min_query_index == 0 {
            return Ok(state);
        }
        let wait = if options.max_query_time.is_zero() {
            DEFAULT_MAX_QUERY_TIME
        } else {
            options.max_query_time.min(DEFAULT_MAX_QUERY_TIME)
        };
        let deadline = Instant::now() + wait;

        while state.index <= options.min_query_index {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (next, _) = self
                .changed
                .wait_timeout(state, deadline - now)
                .map_err(lock_error)?;
            state = next;
        }
        Ok(state)
    }

    fn read(
        &self,
        query: &ConfigEntryQuery,
        select: impl FnOnce(&Entries) -> Vec<ConfigEntry>,
    ) -> Result<IndexedConfigEntries, BackendError> {
        self.check_token(&query.query_options.token)?;
        let datacenter = self.resolve_datacenter(&query.datacenter);

        let state = self.lock()?;
        if !state.datacenters.contains_key(datacenter) {
            return Err(no_path());
        }
        let state = self.wait_for_change(state, &query.query_options)?;
        let entries = state
            .datacenters
            .get(datacenter)
            .map(select)
            .unwrap_or_default();

        Ok(IndexedConfigEntries {
            kind: query.kind.clone(),
            entries,
            query_meta: QueryMeta {
                index: state.index,
                known_leader: true,
            },
        })
    }

    fn remove(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        let datacenter = self.resolve_datacenter(&request.datacenter);
        let key = entry_key(&request.entry);

        let mut guard = self.lock()?;
        let state = &mut *guard;
        let entries = state.datacenters.get_mut(datacenter).ok_or_else(no_path)?;
        if entries.remove(&key).is_some() {
            state.index += 1;
            log::debug!("Deleted {}/{} at index {}", key.0, key.1, state.index);
            drop(guard);
            self.changed.notify_all();
        } else {
            log::debug!("Delete of missing entry {}/{}", key.0, key.1);
        }
        Ok(())
    }

    fn upsert(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        let datacenter = self.resolve_datacenter(&request.datacenter);
        let key = entry_key(&request.entry);

        let mut guard = self.lock()?;
        let state = &mut *guard;
        let entries = state.datacenters.get_mut(datacenter).ok_or_else(no_path)?;
        state.index += 1;

        let create_index = entries
            .get(&key)
            .map_or(state.index, ConfigEntry::create_index);
        let mut entry = request.entry.clone();
        entry.set_indexes(create_index, state.index);
        log::debug!("Wrote {}/{} at index {}", key.0, key.1, state.index);
        entries.insert(key, entry);

        drop(guard);
        self.changed.notify_all();
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new("dc1")
    }
}

impl Backend for InMemoryBackend {
    fn get(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        let key = (query.kind.clone(), query.name.clone());
        self.read(query, |entries| entries.get(&key).cloned().into_iter().collect())
    }

    fn list(&self, query: &ConfigEntryQuery) -> Result<IndexedConfigEntries, BackendError> {
        let kind = query.kind.clone();
        self.read(query, |entries| {
            entries
                .range((kind.clone(), String::new())..)
                .take_while(|((k, _), _)| *k == kind)
                .map(|(_, entry)| entry.clone())
                .collect()
        })
    }

    fn delete(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.check_token(&request.token)?;
        self.remove(request)
    }

    fn apply(&self, request: &ConfigEntryRequest) -> Result<(), BackendError> {
        self.check_token(&request.token)?;
        match request.op {
            ConfigEntryOp::Upsert => self.upsert(request),
            ConfigEntryOp::Delete => self.remove(request),
        }
    }
}

fn entry_key(entry: &ConfigEntry) -> (String, String) {
    (entry.kind().to_string(), entry.name().to_string())
}

fn no_path() -> BackendError {
    BackendError::rpc("No path to datacenter")
}

fn lock_error<T>(e: PoisonError<T>) -> BackendError {
    BackendError::rpc(format!("Lock error: {}", e))
}
