//! Configuration Module
//!
//! Handles loading the Redis store configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::backend::DEFAULT_KEY_CHUNK_SIZE;
use crate::error::{CacheError, Result};

/// Store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string of the key-value service
    pub redis_url: String,
    /// Namespace prefixed to every physical key
    pub namespace: String,
    /// TTL in seconds applied to every write
    pub expiration_seconds: u64,
    /// Maximum number of keys sent in one physical request
    pub key_chunk_size: usize,
    /// Log level name used by the command line tool
    pub log_level: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Connection string (default: redis://127.0.0.1:6379)
    /// - `CACHE_NAMESPACE` - Key namespace (default: cache)
    /// - `EXPIRATION_SECONDS` - TTL for every write (default: 3600)
    /// - `KEY_CHUNK_SIZE` - Keys per physical request (default: 30)
    /// - `LOG_LEVEL` - Log level name (default: info)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from `lookup`, which maps a variable name to its value.
    ///
    /// Unset variables take their default; a numeric variable that does not
    /// parse is an `InvalidConfig` error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            namespace: lookup("CACHE_NAMESPACE").unwrap_or(defaults.namespace),
            expiration_seconds: parse_var(&lookup, "EXPIRATION_SECONDS")?
                .unwrap_or(defaults.expiration_seconds),
            key_chunk_size: parse_var(&lookup, "KEY_CHUNK_SIZE")?
                .unwrap_or(defaults.key_chunk_size),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Rejects values that would only fail later, mid-operation.
    pub fn validate(&self) -> Result<()> {
        validate_namespace(&self.namespace)?;
        if self.expiration_seconds == 0 {
            return Err(CacheError::InvalidConfig(
                "expiration_seconds must be positive".to_string(),
            ));
        }
        if self.key_chunk_size == 0 {
            return Err(CacheError::InvalidConfig(
                "key_chunk_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            namespace: "cache".to_string(),
            expiration_seconds: 3600,
            key_chunk_size: DEFAULT_KEY_CHUNK_SIZE,
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>> {
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|_| {
                CacheError::InvalidConfig(format!("{} is not a valid number: {:?}", name, raw))
            })
        })
        .transpose()
}

/// A namespace must be non-empty and free of the `/` delimiter, otherwise two
/// namespaces could share a physical prefix.
pub(crate) fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(CacheError::InvalidConfig(
            "namespace must not be empty".to_string(),
        ));
    }
    if namespace.contains('/') {
        return Err(CacheError::InvalidConfig(format!(
            "namespace {:?} must not contain '/'",
            namespace
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.namespace, "cache");
        assert_eq!(config.expiration_seconds, 3600);
        assert_eq!(config.key_chunk_size, 30);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("REDIS_URL");
        env::remove_var("CACHE_NAMESPACE");
        env::remove_var("EXPIRATION_SECONDS");
        env::remove_var("KEY_CHUNK_SIZE");
        env::remove_var("LOG_LEVEL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.namespace, "cache");
        assert_eq!(config.expiration_seconds, 3600);
        assert_eq!(config.key_chunk_size, 30);
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CACHE_NAMESPACE", "sessions"),
            ("EXPIRATION_SECONDS", "60"),
            ("KEY_CHUNK_SIZE", " 5 "),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.namespace, "sessions");
        assert_eq!(config.expiration_seconds, 60);
        assert_eq!(config.key_chunk_size, 5);
    }

    #[test]
    fn test_config_rejects_malformed_numbers() {
        let result = Config::from_lookup(|name| {
            (name == "EXPIRATION_SECONDS").then(|| "abc".to_string())
        });
        assert!(matches!(result, Err(CacheError::InvalidConfig(msg)) if msg.contains("EXPIRATION_SECONDS")));

        let result = Config::from_lookup(|name| (name == "KEY_CHUNK_SIZE").then(|| "-3".to_string()));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_zero_chunk_size() {
        let config = Config {
            key_chunk_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_zero_expiration() {
        let config = Config {
            expiration_seconds: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_namespace() {
        assert!(validate_namespace("users").is_ok());
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("users/v2").is_err());
    }
}
