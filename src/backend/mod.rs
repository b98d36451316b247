//! Backend Module
//!
//! Store implementation on top of an external key-value service with
//! expiration, plus the connection capability it needs from that service.

mod codec;
mod memory_conn;
mod redis_conn;
mod redis_store;

use std::sync::Arc;

use crate::error::Result;

// Re-export public types
pub use codec::{BytesCodec, Decoder, Encoder, JsonCodec, Utf8Codec};
pub use memory_conn::{ConnectionStats, MemoryConnection};
pub use redis_conn::RedisConnection;
pub use redis_store::RedisStore;

// == Public Constants ==
/// Default number of keys sent in one physical request
pub const DEFAULT_KEY_CHUNK_SIZE: usize = 30;

// == Connection Capability ==
/// The primitives a key-value service must offer to back a [`RedisStore`].
///
/// Keys and values are raw bytes; namespacing and encoding happen in the store.
/// Any client providing these four operations is substitutable.
pub trait KvConnection {
    /// Fetches several keys in one request, positionally.
    fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Writes every pair with the same expiration in one non-transactional
    /// batch, returning each write's success flag in order.
    fn set_ex(&self, entries: &[(Vec<u8>, Vec<u8>)], expiration_seconds: u64)
        -> Result<Vec<bool>>;

    /// Deletes several keys in one request, returning whether each existed.
    fn delete(&self, keys: &[Vec<u8>]) -> Result<Vec<bool>>;

    /// One step of a scan over the keys starting with `prefix`.
    ///
    /// Start with cursor 0 and pass back the returned cursor until it is 0
    /// again. A key present for the whole scan is returned at least once; keys
    /// deleted between steps do not disturb the scan.
    fn scan_prefix(&self, prefix: &[u8], cursor: u64) -> Result<(u64, Vec<Vec<u8>>)>;
}

impl<T: KvConnection + ?Sized> KvConnection for Arc<T> {
    fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        (**self).mget(keys)
    }

    fn set_ex(
        &self,
        entries: &[(Vec<u8>, Vec<u8>)],
        expiration_seconds: u64,
    ) -> Result<Vec<bool>> {
        (**self).set_ex(entries, expiration_seconds)
    }

    fn delete(&self, keys: &[Vec<u8>]) -> Result<Vec<bool>> {
        (**self).delete(keys)
    }

    fn scan_prefix(&self, prefix: &[u8], cursor: u64) -> Result<(u64, Vec<Vec<u8>>)> {
        (**self).scan_prefix(prefix, cursor)
    }
}

impl<T: KvConnection + ?Sized> KvConnection for &T {
    fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        (**self).mget(keys)
    }

    fn set_ex(
        &self,
        entries: &[(Vec<u8>, Vec<u8>)],
        expiration_seconds: u64,
    ) -> Result<Vec<bool>> {
        (**self).set_ex(entries, expiration_seconds)
    }

    fn delete(&self, keys: &[Vec<u8>]) -> Result<Vec<bool>> {
        (**self).delete(keys)
    }

    fn scan_prefix(&self, prefix: &[u8], cursor: u64) -> Result<(u64, Vec<Vec<u8>>)> {
        (**self).scan_prefix(prefix, cursor)
    }
}
