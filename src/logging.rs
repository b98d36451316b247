//! Logging Module
//!
//! Subscriber setup for executables and credential masking for connection
//! strings that end up in logs. Library code only emits `tracing` events.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use crate::error::{CacheError, Result};

const MASK: &str = "***";

/// Installs a stderr subscriber at `level`, with each target in `quiet`
/// limited to errors. `RUST_LOG`, when set, takes precedence.
///
/// Call once, from executables only.
pub fn setup(level: &str, quiet: &[&str]) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(directives(level, quiet)?),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| CacheError::InvalidConfig(format!("logging already initialized: {}", e)))
}

/// Filter directives for a base level plus quieted targets, e.g.
/// `info,redis=error`.
fn directives(level: &str, quiet: &[&str]) -> Result<String> {
    let level: LevelFilter = level
        .parse()
        .map_err(|_| CacheError::InvalidConfig(format!("{} is not a valid log level", level)))?;

    let mut directives = level.to_string().to_lowercase();
    for target in quiet {
        directives.push_str(&format!(",{}=error", target));
    }
    Ok(directives)
}

/// Masks the password of `url`, and the username too if `remove_username`.
pub fn anonymize_url(url: &str, remove_username: bool) -> Result<String> {
    let mut parsed = Url::parse(url)?;

    if parsed.password().is_some() {
        // Only fails for URLs that cannot carry credentials
        let _ = parsed.set_password(Some(MASK));
    }
    if remove_username && !parsed.username().is_empty() {
        let _ = parsed.set_username(MASK);
    }
    Ok(parsed.to_string())
}
