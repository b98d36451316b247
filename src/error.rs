//! Error types for the store layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for stores, codecs and configuration.
///
/// A missing key is never an error: stores report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The key-value service failed (network, protocol, or server error)
    #[error("Backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// Structured (JSON) encoding or decoding failed
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored representation could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid construction-time configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A connection string could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A wrapped store returned a result of the wrong length
    #[error("Store returned {actual} results for {expected} keys")]
    LengthMismatch { expected: usize, actual: usize },
}

impl CacheError {
    /// Checks that a batched call answered every key it was asked for.
    pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(CacheError::LengthMismatch { expected, actual })
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the store layer.
pub type Result<T> = std::result::Result<T, CacheError>;
