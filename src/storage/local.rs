//! Local filesystem cache implementation.
//!
//! One JSON file per entry, written atomically (temp file, then rename).
//! A corrupt or unreadable file surfaces as an error from `get`; callers
//! treat that as a miss.
//!
//! ## Entry Layout
//!
//! ```text
//! {
//!   "namespace": "search",
//!   "params": "[\"rust\",{...}]",
//!   "stored_at": "2026-01-01T12:00:00Z",
//!   "value": [ ... ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{CacheEntry, CacheKey, CacheStore};
use crate::utils::time::{Clock, SystemClock};

const ENTRY_EXTENSION: &str = "json";

/// Distinguishes temp files of concurrent writers within one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Local filesystem cache backend.
#[derive(Clone)]
pub struct FileCache {
    root_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    /// Create a new FileCache rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(root_dir, Arc::new(SystemClock))
    }

    /// Create a FileCache with a custom time source.
    pub fn with_clock(root_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            root_dir: root_dir.into(),
            clock,
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for an entry.
    fn path(&self, key: &CacheKey) -> PathBuf {
        self.root_dir
            .join(format!("{}.{}", key.digest(), ENTRY_EXTENSION))
    }

    /// Unique sibling temp path for one write to `path`.
    fn tmp_path(path: &Path) -> PathBuf {
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}-{}.tmp", std::process::id(), seq));
        path.with_file_name(name)
    }

    /// Write bytes atomically (write to temp, then rename).
    ///
    /// Every write gets its own temp file, so concurrent writers to one key
    /// never share a file; the last rename wins.
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = Self::tmp_path(path);
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Io(e));
        }
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.write_bytes(path, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match self.read_bytes(path).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Paths of all entry files. A missing cache directory has no entries.
    async fn entry_paths(&self) -> Result<Vec<PathBuf>> {
        let mut dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut paths = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    async fn remove(&self, path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &CacheKey, ttl: Duration) -> Result<Option<Value>> {
        let path = self.path(key);
        let Some(entry) = self.read_json::<CacheEntry<Value>>(&path).await? else {
            return Ok(None);
        };

        if !entry.belongs_to(key) {
            return Err(AppError::cache(format!(
                "entry {} does not match its key",
                path.display()
            )));
        }
        if !entry.is_fresh(self.clock.now(), ttl) {
            log::debug!("Cache entry {} expired", path.display());
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn set(&self, key: &CacheKey, value: Value) -> Result<()> {
        let entry = CacheEntry::new(key, self.clock.now(), value);
        self.write_json(&self.path(key), &entry).await
    }

    async fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self.entry_paths().await? {
            if self.remove(&path).await? {
                removed += 1;
            }
        }
        log::info!("Cleared {} cache entries", removed);
        Ok(removed)
    }

    async fn prune(&self, ttl: Duration) -> Result<usize> {
        let now = self.clock.now();
        let mut removed = 0;

        for path in self.entry_paths().await? {
            let entry = match self.read_json::<CacheEntry<Value>>(&path).await {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Skipping unreadable cache entry {}: {}", path.display(), e);
                    continue;
                }
            };

            if !entry.is_fresh(now, ttl) && self.remove(&path).await? {
                removed += 1;
            }
        }
        log::info!("Pruned {} expired cache entries", removed);
        Ok(removed)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entry_paths().await?.len())
    }
}
