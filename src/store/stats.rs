//! Store Statistics Module
//!
//! Counters kept by the in-process store, one update per key of each batch.

// == Cache Stats ==
/// Counters of a `MemoryStore`, as returned by `MemoryStore::stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requested keys answered with a value
    pub hits: u64,
    /// Requested keys absent or expired; sentinels are not counted
    pub misses: u64,
    /// Entries written by `mset`
    pub writes: u64,
    /// Entries dropped because their TTL ran out
    pub expirations: u64,
    /// Entries dropped by the capacity limit
    pub evictions: u64,
    /// Entries currently held, expired ones included until dropped
    pub entries: usize,
}

impl CacheStats {
    /// Share of requested keys that were hits, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub(crate) fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}
