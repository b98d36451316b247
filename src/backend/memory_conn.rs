//! In-process keyspace implementing the connection capability.
//!
//! Behaves like a single Redis database: byte keys, per-key expiration, prefix
//! listing. Clones share the keyspace, so several stores can sit on "the same
//! physical connection". Request counters expose how operations were chunked.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::backend::KvConnection;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::store::Entry;

/// Physical requests received by a [`MemoryConnection`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub mget_requests: u64,
    pub set_requests: u64,
    pub delete_requests: u64,
    pub scan_requests: u64,
    /// Most keys carried by a single request
    pub largest_request: usize,
}

impl ConnectionStats {
    fn record(&mut self, keys: usize) {
        self.largest_request = self.largest_request.max(keys);
    }
}

#[derive(Default)]
struct Keyspace {
    entries: HashMap<Vec<u8>, Entry<Vec<u8>>>,
    stats: ConnectionStats,
}

// == Memory Connection ==
#[derive(Clone)]
pub struct MemoryConnection<C = SystemClock> {
    keyspace: Arc<Mutex<Keyspace>>,
    clock: C,
}

impl MemoryConnection<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryConnection<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryConnection<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            keyspace: Arc::new(Mutex::new(Keyspace::default())),
            clock,
        }
    }

    /// Number of live (unexpired) keys across all namespaces.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.keyspace
            .lock()
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every live physical key, sorted.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let now = self.clock.now();
        let mut keys: Vec<Vec<u8>> = self
            .keyspace
            .lock()
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Remaining lifetime of a physical key, None if absent.
    pub fn ttl(&self, key: &[u8]) -> Option<Duration> {
        let now = self.clock.now();
        self.keyspace
            .lock()
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }

    pub fn stats(&self) -> ConnectionStats {
        self.keyspace.lock().stats.clone()
    }
}

impl<C: Clock> KvConnection for MemoryConnection<C> {
    fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        let now = self.clock.now();
        let mut keyspace = self.keyspace.lock();
        keyspace.stats.mget_requests += 1;
        keyspace.stats.record(keys.len());

        Ok(keys
            .iter()
            .map(|key| {
                keyspace
                    .entries
                    .get(key)
                    .filter(|entry| !entry.is_expired(now))
                    .map(|entry| entry.value.clone())
            })
            .collect())
    }

    fn set_ex(
        &self,
        entries: &[(Vec<u8>, Vec<u8>)],
        expiration_seconds: u64,
    ) -> Result<Vec<bool>> {
        let now = self.clock.now();
        let ttl = Some(Duration::from_secs(expiration_seconds));
        let mut keyspace = self.keyspace.lock();
        keyspace.stats.set_requests += 1;
        keyspace.stats.record(entries.len());

        Ok(entries
            .iter()
            .map(|(key, value)| {
                keyspace
                    .entries
                    .insert(key.clone(), Entry::new(value.clone(), now, ttl));
                true
            })
            .collect())
    }

    fn delete(&self, keys: &[Vec<u8>]) -> Result<Vec<bool>> {
        let now = self.clock.now();
        let mut keyspace = self.keyspace.lock();
        keyspace.stats.delete_requests += 1;
        keyspace.stats.record(keys.len());

        Ok(keys
            .iter()
            .map(|key| {
                keyspace
                    .entries
                    .remove(key)
                    .is_some_and(|entry| !entry.is_expired(now))
            })
            .collect())
    }

    /// Answers the whole scan in a single step.
    fn scan_prefix(&self, prefix: &[u8], _cursor: u64) -> Result<(u64, Vec<Vec<u8>>)> {
        let now = self.clock.now();
        let mut keyspace = self.keyspace.lock();
        keyspace.stats.scan_requests += 1;
        // Drop what has expired, as the server would
        keyspace.entries.retain(|_, entry| !entry.is_expired(now));

        let keys = keyspace
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        Ok((0, keys))
    }
}
