//! Store Module
//!
//! Batched read/write store contracts and their composable implementations.
//!
//! Every store answers `mget` positionally: the result has one slot per
//! requested key. A `None` key means "no lookup requested" and always yields
//! `None` without touching any backing store. A `None` value means "not found";
//! stores never hold it as a real value.

mod entry;
mod function;
mod layered;
mod lru;
mod memory;
mod stats;


use std::sync::Arc;

use crate::error::Result;

// Re-export public types
pub(crate) use entry::Entry;
pub(crate) use lru::LruTracker;
pub use function::FunctionStore;
pub use layered::SingleLayerCache;
pub use memory::MemoryStore;
pub use stats::CacheStats;

// == Read Store ==
/// Store that supports batched reads.
pub trait ReadStore<K, V> {
    /// Gets values for `keys`, one result per key in the same order.
    fn mget(&self, keys: &[Option<K>]) -> Result<Vec<Option<V>>>;

    /// Gets a single key.
    fn get(&self, key: &K) -> Result<Option<V>>
    where
        K: Clone,
    {
        Ok(self.mget(&[Some(key.clone())])?.into_iter().next().flatten())
    }
}

// == Write Store ==
/// Store that supports batched writes.
///
/// No call is atomic across its batch; per-entry outcomes are reported in the
/// returned flags.
pub trait WriteStore<K, V> {
    /// Writes every pair, returning one success flag per pair in order.
    fn mset(&self, kvs: &[(K, V)]) -> Result<Vec<bool>>;

    /// Removes keys, returning whether each one was present.
    fn delete(&self, keys: &[K]) -> Result<Vec<bool>>;

    /// Removes every key this store ever wrote.
    fn clear(&self) -> Result<bool>;
}

// == Read Write Store ==
/// Store that supports reading and writing.
pub trait ReadWriteStore<K, V>: ReadStore<K, V> + WriteStore<K, V> {}

impl<K, V, S> ReadWriteStore<K, V> for S where S: ReadStore<K, V> + WriteStore<K, V> + ?Sized {}

// == Handle Forwarding ==
impl<K, V, S: ReadStore<K, V> + ?Sized> ReadStore<K, V> for &S {
    fn mget(&self, keys: &[Option<K>]) -> Result<Vec<Option<V>>> {
        (**self).mget(keys)
    }
}

impl<K, V, S: ReadStore<K, V> + ?Sized> ReadStore<K, V> for Arc<S> {
    fn mget(&self, keys: &[Option<K>]) -> Result<Vec<Option<V>>> {
        (**self).mget(keys)
    }
}

impl<K, V, S: WriteStore<K, V> + ?Sized> WriteStore<K, V> for &S {
    fn mset(&self, kvs: &[(K, V)]) -> Result<Vec<bool>> {
        (**self).mset(kvs)
    }

    fn delete(&self, keys: &[K]) -> Result<Vec<bool>> {
        (**self).delete(keys)
    }

    fn clear(&self) -> Result<bool> {
        (**self).clear()
    }
}

impl<K, V, S: WriteStore<K, V> + ?Sized> WriteStore<K, V> for Arc<S> {
    fn mset(&self, kvs: &[(K, V)]) -> Result<Vec<bool>> {
        (**self).mset(kvs)
    }

    fn delete(&self, keys: &[K]) -> Result<Vec<bool>> {
        (**self).delete(keys)
    }

    fn clear(&self) -> Result<bool> {
        (**self).clear()
    }
}
