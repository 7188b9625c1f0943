//! In-memory authoritative store for config entries.
//!
//! `InMemoryBackend` implements the four backend calls against a map per
//! datacenter. It is the store the gateway talks to in tests and local
//! setups, and follows the indexing rules of a real one: every write bumps a
//! single store-wide index, an entry's `CreateIndex` survives updates, and
//! every read reports the index it was served at.

mod store;

pub use store::InMemoryBackend;

/// Longest a blocking read waits when the query gives no `MaxQueryTime`.
pub const DEFAULT_MAX_QUERY_TIME: std::time::Duration = std::time::Duration::from_secs(300);
