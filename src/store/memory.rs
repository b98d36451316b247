//! Memory Store Module
//!
//! In-process read-write store combining HashMap storage with optional LRU
//! capacity and TTL expiration. Typically used as the cache layer of a
//! [`SingleLayerCache`](crate::store::SingleLayerCache).

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::store::{CacheStats, Entry, LruTracker, ReadStore, WriteStore};

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    lru: LruTracker<K>,
    stats: CacheStats,
}

impl<K: Eq + Hash + Clone, V> Inner<K, V> {
    fn remove(&mut self, key: &K) -> Option<Entry<V>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.lru.remove(key);
        }
        removed
    }

    /// Drops every expired entry, returning how many were dropped.
    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        self.stats.expirations += expired.len() as u64;
        expired.len()
    }
}

// == Memory Store ==
/// Thread-safe in-memory store.
///
/// Expired entries are dropped lazily when read, or eagerly through
/// [`cleanup_expired`](MemoryStore::cleanup_expired).
pub struct MemoryStore<K, V, C = SystemClock> {
    inner: Mutex<Inner<K, V>>,
    /// Maximum number of entries, None = unbounded
    max_entries: Option<usize>,
    /// TTL applied to every write, None = never expires
    ttl: Option<Duration>,
    clock: C,
}

impl<K, V> MemoryStore<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an unbounded store whose entries never expire.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for MemoryStore<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> MemoryStore<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    pub fn with_clock(clock: C) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                stats: CacheStats::default(),
            }),
            max_entries: None,
            ttl: None,
            clock,
        }
    }

    /// Bounds the store; the least recently used entry is evicted when full.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Expires every entry `ttl` after it was written.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            ..inner.stats.clone()
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        self.inner.lock().purge_expired(now)
    }

    /// Number of stored entries, including expired ones not yet cleaned up.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl<K, V, C> ReadStore<K, V> for MemoryStore<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn mget(&self, keys: &[Option<K>]) -> Result<Vec<Option<V>>> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let values = keys
            .iter()
            .map(|key| {
                let key = key.as_ref()?;
                match inner.entries.get(key) {
                    Some(entry) if entry.is_expired(now) => {
                        inner.remove(key);
                        inner.stats.expirations += 1;
                        inner.stats.record_lookup(false);
                        None
                    }
                    Some(entry) => {
                        let value = entry.value.clone();
                        inner.stats.record_lookup(true);
                        inner.lru.touch(key);
                        Some(value)
                    }
                    None => {
                        inner.stats.record_lookup(false);
                        None
                    }
                }
            })
            .collect();
        Ok(values)
    }
}

impl<K, V, C> WriteStore<K, V> for MemoryStore<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn mset(&self, kvs: &[(K, V)]) -> Result<Vec<bool>> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let flags = kvs
            .iter()
            .map(|(key, value)| {
                let is_overwrite = inner.entries.contains_key(key);

                if let Some(max_entries) = self.max_entries {
                    // Expired entries give up their slots before a live one is evicted
                    if !is_overwrite && inner.entries.len() >= max_entries {
                        inner.purge_expired(now);
                    }
                    if !is_overwrite && inner.entries.len() >= max_entries {
                        match inner.lru.evict_oldest() {
                            Some(evicted) => {
                                inner.entries.remove(&evicted);
                                inner.stats.evictions += 1;
                            }
                            // Nothing to evict: a zero-capacity store keeps nothing
                            None => return false,
                        }
                    }
                }

                inner
                    .entries
                    .insert(key.clone(), Entry::new(value.clone(), now, self.ttl));
                inner.lru.touch(key);
                inner.stats.writes += 1;
                true
            })
            .collect();
        Ok(flags)
    }

    fn delete(&self, keys: &[K]) -> Result<Vec<bool>> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        Ok(keys
            .iter()
            .map(|key| {
                inner
                    .remove(key)
                    .is_some_and(|entry| !entry.is_expired(now))
            })
            .collect())
    }

    fn clear(&self) -> Result<bool> {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.lru.clear();
        Ok(true)
    }
}
