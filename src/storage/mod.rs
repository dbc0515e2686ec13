//! Key-value cache for search results.
//!
//! Entries are keyed by a namespace plus a canonical JSON rendering of the
//! parameters that produced them, and carry the time they were stored.
//! Freshness is decided on read against a caller-supplied TTL; expired
//! entries are only deleted by `prune` or `clear`.
//!
//! ## Directory Structure (`FileCache`)
//!
//! ```text
//! {cache_dir}/
//! ├── 3f1c...e9.json        # one entry, named by SHA-256 of namespace + params
//! └── 9a07...41.json
//! ```

pub mod local;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Result;

// Re-export for convenience
pub use local::FileCache;
pub use memory::MemoryCache;

/// How long aggregated search results stay fresh.
pub const SEARCH_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Namespace for aggregated search results.
pub const SEARCH_NAMESPACE: &str = "search";

/// Deterministic cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    params: String,
}

impl CacheKey {
    /// Build a key from any serializable parameter object.
    ///
    /// Object keys are sorted recursively, so two equal parameter sets
    /// always produce the same key regardless of field order.
    pub fn new(namespace: impl Into<String>, params: &impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(params)?;
        Ok(Self {
            namespace: namespace.into(),
            params: canonical_json(&value),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn params(&self) -> &str {
        &self.params
    }

    /// Hex SHA-256 over namespace and params, used as a storage file name.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.namespace.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.params.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Stored value plus the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry<T> {
    pub namespace: String,
    pub params: String,
    pub stored_at: DateTime<Utc>,
    pub value: T,
}

impl<T> CacheEntry<T> {
    pub fn new(key: &CacheKey, stored_at: DateTime<Utc>, value: T) -> Self {
        Self {
            namespace: key.namespace.clone(),
            params: key.params.clone(),
            stored_at,
            value,
        }
    }

    /// Valid iff `now - stored_at <= ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        // A TTL too large for chrono never expires.
        chrono::Duration::from_std(ttl)
            .map(|ttl| now - self.stored_at <= ttl)
            .unwrap_or(true)
    }

    /// Whether this entry was stored under `key`.
    pub fn belongs_to(&self, key: &CacheKey) -> bool {
        self.namespace == key.namespace && self.params == key.params
    }
}

/// Trait for cache backends.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value stored under `key` if it is at most `ttl` old.
    async fn get(&self, key: &CacheKey, ttl: Duration) -> Result<Option<Value>>;

    /// Store or overwrite the value under `key`, stamped with the current time.
    async fn set(&self, key: &CacheKey, value: Value) -> Result<()>;

    /// Remove every entry, returning how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// Remove entries older than `ttl`, returning how many were removed.
    async fn prune(&self, ttl: Duration) -> Result<usize>;

    /// Number of stored entries, fresh or not.
    async fn len(&self) -> Result<usize>;
}

/// Typed read on top of a `CacheStore`.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &CacheKey,
    ttl: Duration,
) -> Result<Option<T>> {
    match store.get(key, ttl).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Typed write on top of a `CacheStore`.
pub async fn set_typed<T: Serialize + ?Sized>(
    store: &dyn CacheStore,
    key: &CacheKey,
    value: &T,
) -> Result<()> {
    store.set(key, serde_json::to_value(value)?).await
}

/// Render JSON with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
