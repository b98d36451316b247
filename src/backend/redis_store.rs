//! Redis Store Module
//!
//! Read-write store on a key-value service with expiration. Owns key
//! namespacing, encoding, expiration and request chunking.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::backend::{Decoder, Encoder, JsonCodec, KvConnection, DEFAULT_KEY_CHUNK_SIZE};
use crate::config::{validate_namespace, Config};
use crate::error::{CacheError, Result};
use crate::store::{ReadStore, WriteStore};

type BoxedEncoder<T> = Box<dyn Encoder<T> + Send + Sync>;
type BoxedDecoder<T> = Box<dyn Decoder<T> + Send + Sync>;

// == Redis Store ==
/// Namespaced, expiring store backed by a [`KvConnection`].
///
/// Physical keys are `"<name>/"` followed by the encoded key, so stores with
/// different names never see each other's keys on a shared keyspace. Every
/// write carries the store's expiration. Reads and deletes are split into
/// requests of at most `key_chunk_size` keys, sent one after the other.
///
/// Keys and values are JSON-encoded unless other codecs are supplied.
pub struct RedisStore<K, V, C> {
    connection: C,
    name: String,
    /// Encoded namespace, `"<name>/"`
    prefix: Vec<u8>,
    expiration_seconds: u64,
    key_chunk_size: usize,
    key_encoder: BoxedEncoder<K>,
    value_encoder: BoxedEncoder<V>,
    value_decoder: BoxedDecoder<V>,
}

impl<K, V, C> RedisStore<K, V, C>
where
    K: Serialize,
    V: Serialize + DeserializeOwned,
    C: KvConnection,
{
    // == Constructor ==
    /// Creates a store writing under `name` with the default chunk size.
    ///
    /// Fails on an empty name, a name containing `/`, or a zero expiration.
    pub fn new(connection: C, name: impl Into<String>, expiration_seconds: u64) -> Result<Self> {
        let name = name.into();
        validate_namespace(&name)?;
        if expiration_seconds == 0 {
            return Err(CacheError::InvalidConfig(
                "expiration_seconds must be positive".to_string(),
            ));
        }

        let mut prefix = name.clone().into_bytes();
        prefix.push(b'/');

        Ok(Self {
            connection,
            name,
            prefix,
            expiration_seconds,
            key_chunk_size: DEFAULT_KEY_CHUNK_SIZE,
            key_encoder: Box::new(JsonCodec),
            value_encoder: Box::new(JsonCodec),
            value_decoder: Box::new(JsonCodec),
        })
    }

    /// Creates a store from the namespace, expiration and chunk size of `config`.
    pub fn from_config(connection: C, config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(connection, config.namespace.clone(), config.expiration_seconds)?
            .with_key_chunk_size(config.key_chunk_size)
    }
}

impl<K, V, C> RedisStore<K, V, C>
where
    C: KvConnection,
{
    /// Bounds how many keys one physical request may carry.
    pub fn with_key_chunk_size(mut self, key_chunk_size: usize) -> Result<Self> {
        if key_chunk_size == 0 {
            return Err(CacheError::InvalidConfig(
                "key_chunk_size must be positive".to_string(),
            ));
        }
        self.key_chunk_size = key_chunk_size;
        Ok(self)
    }

    /// Replaces the key encoding; the namespace prefix is still prepended.
    pub fn with_key_encoder(mut self, encoder: impl Encoder<K> + Send + Sync + 'static) -> Self {
        self.key_encoder = Box::new(encoder);
        self
    }

    pub fn with_value_encoder(mut self, encoder: impl Encoder<V> + Send + Sync + 'static) -> Self {
        self.value_encoder = Box::new(encoder);
        self
    }

    pub fn with_value_decoder(mut self, decoder: impl Decoder<V> + Send + Sync + 'static) -> Self {
        self.value_decoder = Box::new(decoder);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expiration_seconds(&self) -> u64 {
        self.expiration_seconds
    }

    pub fn key_chunk_size(&self) -> usize {
        self.key_chunk_size
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Physical key of `key`: namespace prefix followed by the encoded key.
    pub fn encode_key(&self, key: &K) -> Result<Vec<u8>> {
        let encoded = self.key_encoder.encode(key)?;
        let mut physical = Vec::with_capacity(self.prefix.len() + encoded.len());
        physical.extend_from_slice(&self.prefix);
        physical.extend_from_slice(&encoded);
        Ok(physical)
    }

    fn delete_encoded(&self, keys: &[Vec<u8>]) -> Result<Vec<bool>> {
        let mut removed = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(self.key_chunk_size) {
            let flags = self.connection.delete(chunk)?;
            CacheError::check_len(chunk.len(), flags.len())?;
            removed.extend(flags);
        }
        Ok(removed)
    }
}

impl<K, V, C> fmt::Debug for RedisStore<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("name", &self.name)
            .field("expiration_seconds", &self.expiration_seconds)
            .field("key_chunk_size", &self.key_chunk_size)
            .finish_non_exhaustive()
    }
}

impl<K, V, C> ReadStore<K, V> for RedisStore<K, V, C>
where
    C: KvConnection,
{
    fn mget(&self, keys: &[Option<K>]) -> Result<Vec<Option<V>>> {
        let mut results: Vec<Option<V>> = keys.iter().map(|_| None).collect();

        let mut positions = Vec::with_capacity(keys.len());
        let mut encoded = Vec::with_capacity(keys.len());
        for (idx, key) in keys.iter().enumerate() {
            if let Some(key) = key {
                positions.push(idx);
                encoded.push(self.encode_key(key)?);
            }
        }

        for (pos_chunk, key_chunk) in positions
            .chunks(self.key_chunk_size)
            .zip(encoded.chunks(self.key_chunk_size))
        {
            let values = self.connection.mget(key_chunk)?;
            CacheError::check_len(key_chunk.len(), values.len())?;
            for (&idx, value) in pos_chunk.iter().zip(values) {
                if let Some(bytes) = value {
                    results[idx] = Some(self.value_decoder.decode(&bytes)?);
                }
            }
        }

        debug!(
            store = %self.name,
            requested = keys.len(),
            chunks = encoded.len().div_ceil(self.key_chunk_size),
            "redis store mget"
        );
        Ok(results)
    }
}

impl<K, V, C> WriteStore<K, V> for RedisStore<K, V, C>
where
    C: KvConnection,
{
    fn mset(&self, kvs: &[(K, V)]) -> Result<Vec<bool>> {
        if kvs.is_empty() {
            return Ok(Vec::new());
        }
        let entries = kvs
            .iter()
            .map(|(key, value)| -> Result<(Vec<u8>, Vec<u8>)> {
                Ok((self.encode_key(key)?, self.value_encoder.encode(value)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let flags = self.connection.set_ex(&entries, self.expiration_seconds)?;
        CacheError::check_len(entries.len(), flags.len())?;
        debug!(store = %self.name, written = entries.len(), "redis store mset");
        Ok(flags)
    }

    fn delete(&self, keys: &[K]) -> Result<Vec<bool>> {
        let encoded = keys
            .iter()
            .map(|key| self.encode_key(key))
            .collect::<Result<Vec<_>>>()?;
        self.delete_encoded(&encoded)
    }

    /// Scans the namespace and deletes each page of keys, in chunks, as it
    /// arrives.
    ///
    /// Not atomic: keys written while the scan runs may or may not survive.
    fn clear(&self) -> Result<bool> {
        let mut cursor = 0;
        let mut scanned = 0;
        let mut removed = 0;
        loop {
            let (next, keys) = self.connection.scan_prefix(&self.prefix, cursor)?;
            scanned += keys.len();
            removed += self
                .delete_encoded(&keys)?
                .into_iter()
                .filter(|&flag| flag)
                .count();
            if next == 0 {
                break;
            }
            cursor = next;
        }
        info!(store = %self.name, scanned, removed, "redis store cleared");
        Ok(true)
    }
}
