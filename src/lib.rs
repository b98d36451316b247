//! sak_cache - composable batched key-value stores
//!
//! Stores implement batched `mget` / `mset` / `delete` / `clear` over generic
//! keys and values. A [`SingleLayerCache`] puts a read-write cache layer in front
//! of any read store; [`RedisStore`] is a namespaced, expiring backend for it.
//!
//! ```no_run
//! use sak_cache::{FunctionStore, ReadStore, RedisConnection, RedisStore, SingleLayerCache};
//!
//! # fn main() -> sak_cache::Result<()> {
//! let connection = RedisConnection::open("redis://127.0.0.1:6379")?;
//! let layer: RedisStore<u64, u64, _> = RedisStore::new(connection, "squares", 3600)?;
//! let cache = SingleLayerCache::new(FunctionStore::new(|n: &u64| Some(n * n)), layer);
//!
//! assert_eq!(cache.mget(&[Some(3), None, Some(4)])?, vec![Some(9), None, Some(16)]);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod stream;

pub use backend::{KvConnection, MemoryConnection, RedisConnection, RedisStore};
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{
    FunctionStore, MemoryStore, ReadStore, ReadWriteStore, SingleLayerCache, WriteStore,
};
