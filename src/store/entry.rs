//! Store Entry Module
//!
//! A stored value together with its expiration instant.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::add_duration;

// == Entry ==
/// A single stored value with an optional expiration instant.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an entry written at `now` that lives for `ttl`.
    ///
    /// A TTL too large to represent is treated as no expiration.
    pub fn new(value: V, now: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(|ttl| add_duration(now, ttl)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches its expiration instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining lifetime, `Some(ZERO)` once expired, None without expiration.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at
            .map(|expires| (expires - now).to_std().unwrap_or(Duration::ZERO))
    }
}
