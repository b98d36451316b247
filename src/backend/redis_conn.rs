//! Redis implementations of the connection capability.
//!
//! Reads use `MGET`, writes a non-transactional pipeline of `SETEX`, deletes a
//! pipeline of single-key `DEL` (one round trip, per-key results) and prefix
//! listing one `SCAN MATCH` step per call.

use parking_lot::Mutex;
use redis::{ConnectionLike, Value};
use tracing::debug;

use crate::backend::KvConnection;
use crate::error::Result;
use crate::logging::anonymize_url;

/// Keys requested per `SCAN` step
const SCAN_COUNT: usize = 500;

// == Redis Connection ==
/// A single Redis connection shared behind a mutex.
///
/// Concurrent callers are serialized on the connection.
pub struct RedisConnection {
    inner: Mutex<redis::Connection>,
}

impl RedisConnection {
    pub fn new(connection: redis::Connection) -> Self {
        Self {
            inner: Mutex::new(connection),
        }
    }

    /// Connects to the server at `url` (e.g. `redis://127.0.0.1:6379/0`).
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        debug!(url = %anonymize_url(url, false)?, "Connecting to redis");
        Ok(Self::new(client.get_connection()?))
    }
}

impl KvConnection for RedisConnection {
    fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        mget_on(&mut *self.inner.lock(), keys)
    }

    fn set_ex(
        &self,
        entries: &[(Vec<u8>, Vec<u8>)],
        expiration_seconds: u64,
    ) -> Result<Vec<bool>> {
        set_ex_on(&mut *self.inner.lock(), entries, expiration_seconds)
    }

    fn delete(&self, keys: &[Vec<u8>]) -> Result<Vec<bool>> {
        delete_on(&mut *self.inner.lock(), keys)
    }

    fn scan_prefix(&self, prefix: &[u8], cursor: u64) -> Result<(u64, Vec<Vec<u8>>)> {
        scan_prefix_on(&mut *self.inner.lock(), prefix, cursor)
    }
}

/// A client opens a fresh connection for every request.
impl KvConnection for redis::Client {
    fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        mget_on(&mut self.get_connection()?, keys)
    }

    fn set_ex(
        &self,
        entries: &[(Vec<u8>, Vec<u8>)],
        expiration_seconds: u64,
    ) -> Result<Vec<bool>> {
        set_ex_on(&mut self.get_connection()?, entries, expiration_seconds)
    }

    fn delete(&self, keys: &[Vec<u8>]) -> Result<Vec<bool>> {
        delete_on(&mut self.get_connection()?, keys)
    }

    fn scan_prefix(&self, prefix: &[u8], cursor: u64) -> Result<(u64, Vec<Vec<u8>>)> {
        scan_prefix_on(&mut self.get_connection()?, prefix, cursor)
    }
}

fn mget_on(con: &mut dyn ConnectionLike, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    Ok(redis::cmd("MGET").arg(keys).query(con)?)
}

fn set_ex_on(
    con: &mut dyn ConnectionLike,
    entries: &[(Vec<u8>, Vec<u8>)],
    expiration_seconds: u64,
) -> Result<Vec<bool>> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    let mut pipe = redis::pipe();
    for (key, value) in entries {
        pipe.cmd("SETEX").arg(key).arg(expiration_seconds).arg(value);
    }
    let replies: Vec<Value> = pipe.query(con)?;
    Ok(replies
        .iter()
        .map(|reply| matches!(reply, Value::Okay))
        .collect())
}

fn delete_on(con: &mut dyn ConnectionLike, keys: &[Vec<u8>]) -> Result<Vec<bool>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let mut pipe = redis::pipe();
    for key in keys {
        pipe.cmd("DEL").arg(key);
    }
    let removed: Vec<i64> = pipe.query(con)?;
    Ok(removed.into_iter().map(|count| count > 0).collect())
}

fn scan_prefix_on(
    con: &mut dyn ConnectionLike,
    prefix: &[u8],
    cursor: u64,
) -> Result<(u64, Vec<Vec<u8>>)> {
    let mut pattern = escape_glob(prefix);
    pattern.push(b'*');

    Ok(redis::cmd("SCAN")
        .arg(cursor)
        .arg("MATCH")
        .arg(pattern)
        .arg("COUNT")
        .arg(SCAN_COUNT)
        .query(con)?)
}

/// Escapes glob metacharacters so the prefix matches literally.
fn escape_glob(prefix: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(prefix.len());
    for &byte in prefix {
        if matches!(byte, b'*' | b'?' | b'[' | b']' | b'\\') {
            escaped.push(b'\\');
        }
        escaped.push(byte);
    }
    escaped
}
