//! sak-cache - inspect and maintain a namespaced Redis store
//!
//! Keys are JSON strings and values JSON documents, matching the default
//! encoding of `RedisStore`, so the tool reads and writes the same entries as
//! library users of the namespace.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;

use sak_cache::logging::{anonymize_url, setup};
use sak_cache::{Config, ReadStore, RedisConnection, RedisStore, WriteStore};

#[derive(Parser, Debug)]
#[command(name = "sak-cache")]
#[command(about = "Read, write and clear entries of a namespaced Redis store", long_about = None)]
struct Args {
    /// Redis connection string [env: REDIS_URL]
    #[arg(long)]
    redis_url: Option<String>,

    /// Store namespace [env: CACHE_NAMESPACE]
    #[arg(short, long)]
    namespace: Option<String>,

    /// TTL applied to written entries [env: EXPIRATION_SECONDS]
    #[arg(long)]
    expiration_seconds: Option<u64>,

    /// Keys per physical request [env: KEY_CHUNK_SIZE]
    #[arg(long)]
    key_chunk_size: Option<usize>,

    /// Log level [env: LOG_LEVEL]
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the values of keys (null when absent)
    Get { keys: Vec<String> },
    /// Store a JSON value under a key
    Set { key: String, value: String },
    /// Delete keys
    Del { keys: Vec<String> },
    /// Delete every key of the namespace
    Clear,
}

impl Args {
    /// Command line options override the environment.
    fn config(&self) -> sak_cache::Result<Config> {
        let mut config = Config::from_env()?;
        if let Some(redis_url) = &self.redis_url {
            config.redis_url = redis_url.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(expiration_seconds) = self.expiration_seconds {
            config.expiration_seconds = expiration_seconds;
        }
        if let Some(key_chunk_size) = self.key_chunk_size {
            config.key_chunk_size = key_chunk_size;
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.config().context("invalid configuration")?;
    config.validate().context("invalid configuration")?;

    setup(&config.log_level, &["redis"]).context("failed to set up logging")?;
    info!(
        "Configuration loaded: redis_url={}, namespace={}, expiration={}s, key_chunk_size={}",
        anonymize_url(&config.redis_url, false)?,
        config.namespace,
        config.expiration_seconds,
        config.key_chunk_size
    );

    let connection = RedisConnection::open(&config.redis_url).context("failed to connect to redis")?;
    let store: RedisStore<String, Value, _> = RedisStore::from_config(connection, &config)?;

    let output = run(&store, args.command)?;
    println!("{}", output);
    Ok(())
}

fn run<S>(store: &S, command: Command) -> Result<Value>
where
    S: ReadStore<String, Value> + WriteStore<String, Value>,
{
    let output = match command {
        Command::Get { keys } => {
            let lookups: Vec<Option<String>> = keys.iter().cloned().map(Some).collect();
            let values = store.mget(&lookups)?;
            let entries: serde_json::Map<String, Value> = keys
                .into_iter()
                .zip(values)
                .map(|(key, value)| (key, value.unwrap_or(Value::Null)))
                .collect();
            Value::Object(entries)
        }
        Command::Set { key, value } => {
            let value: Value = serde_json::from_str(&value)
                .with_context(|| format!("value for {:?} is not valid JSON", key))?;
            let written = store.mset(&[(key.clone(), value)])?;
            json!({ "key": key, "written": written.first().copied().unwrap_or(false) })
        }
        Command::Del { keys } => {
            let removed = store.delete(&keys)?;
            json!({ "removed": removed.iter().filter(|&&flag| flag).count() })
        }
        Command::Clear => json!({ "cleared": store.clear()? }),
    };
    Ok(output)
}
