//! In-memory cache backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::storage::{CacheEntry, CacheKey, CacheStore};
use crate::utils::time::{Clock, SystemClock};

/// Process-local cache, mainly for tests and embedding callers.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry<Value>>>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry<Value>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &CacheKey, ttl: Duration) -> Result<Option<Value>> {
        let now = self.clock.now();
        Ok(self
            .entries()
            .get(key)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<()> {
        let entry = CacheEntry::new(key, self.clock.now(), value);
        self.entries().insert(key.clone(), entry);
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = self.entries();
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    async fn prune(&self, ttl: Duration) -> Result<usize> {
        let now = self.clock.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, ttl));
        Ok(before - entries.len())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SEARCH_CACHE_TTL, SEARCH_NAMESPACE};
    use crate::utils::time::ManualClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip_then_expiry() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
        ));
        let cache = MemoryCache::with_clock(clock.clone());
        let key = CacheKey::new(SEARCH_NAMESPACE, &"rust").unwrap();

        cache.set(&key, json!(["job"])).await.unwrap();
        assert_eq!(
            cache.get(&key, SEARCH_CACHE_TTL).await.unwrap(),
            Some(json!(["job"]))
        );

        clock.advance(chrono::Duration::minutes(31));
        assert_eq!(cache.get(&key, SEARCH_CACHE_TTL).await.unwrap(), None);
        assert_eq!(cache.prune(SEARCH_CACHE_TTL).await.unwrap(), 1);
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_counts() {
        let cache = MemoryCache::new();
        for q in ["a", "b", "c"] {
            let key = CacheKey::new(SEARCH_NAMESPACE, &q).unwrap();
            cache.set(&key, json!(null)).await.unwrap();
        }
        assert_eq!(cache.clear().await.unwrap(), 3);
    }
}
