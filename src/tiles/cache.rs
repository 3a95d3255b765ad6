//! Tile byte storage keyed by `(provider, zoom, x, y)`.
//!
//! Stores hold encoded tile bytes exactly as received from the network.
//! Presence of an entry is the only cache-hit test; there is no expiry.

use crate::core::geo::TileCoord;
use crate::prelude::{Arc, Mutex};
use crate::Result;
use async_trait::async_trait;
use lru::LruCache;
use std::fmt;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::MutexGuard;

/// Identity of one cached tile. `coord` is in the provider's own (XYZ) row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub provider: &'static str,
    pub coord: TileCoord,
}

impl TileKey {
    pub fn new(provider: &'static str, coord: TileCoord) -> Self {
        Self { provider, coord }
    }

    /// Deterministic file name for this key
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.png",
            self.provider, self.coord.z, self.coord.x, self.coord.y
        )
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.coord)
    }
}

/// Idempotent put-if-absent storage for encoded tiles
#[async_trait]
pub trait TileStore: Send + Sync {
    async fn get(&self, key: &TileKey) -> Result<Option<Arc<Vec<u8>>>>;

    /// Stores `data` unless an entry already exists; returns whether it was written
    async fn put_if_absent(&self, key: &TileKey, data: Arc<Vec<u8>>) -> Result<bool>;

    /// Drops an entry, used when a stored tile turns out to be corrupt
    async fn remove(&self, key: &TileKey) -> Result<()>;
}

/// In-memory tile cache using LRU eviction
#[derive(Debug)]
pub struct MemoryTileStore {
    cache: Arc<Mutex<LruCache<TileKey, Arc<Vec<u8>>>>>,
}

impl MemoryTileStore {
    /// Create a new tile cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Create a new tile cache with default capacity (1024 tiles)
    pub fn with_default_capacity() -> Self {
        Self::new(1024)
    }

    /// A poisoned lock is logged and treated as an unusable cache
    fn lock(&self) -> Option<MutexGuard<'_, LruCache<TileKey, Arc<Vec<u8>>>>> {
        match self.cache.lock() {
            Ok(cache) => Some(cache),
            Err(_) => {
                log::warn!("memory tile cache lock is poisoned, bypassing cache");
                None
            }
        }
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.lock().map(|cache| cache.contains(key)).unwrap_or(false)
    }
}

impl Clone for MemoryTileStore {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl Default for MemoryTileStore {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl TileStore for MemoryTileStore {
    async fn get(&self, key: &TileKey) -> Result<Option<Arc<Vec<u8>>>> {
        Ok(self.lock().and_then(|mut c| c.get(key).cloned()))
    }

    async fn put_if_absent(&self, key: &TileKey, data: Arc<Vec<u8>>) -> Result<bool> {
        let Some(mut cache) = self.lock() else {
            return Ok(false);
        };
        if cache.contains(key) {
            return Ok(false);
        }
        cache.put(*key, data);
        Ok(true)
    }

    async fn remove(&self, key: &TileKey) -> Result<()> {
        if let Some(mut cache) = self.lock() {
            cache.pop(key);
        }
        Ok(())
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One file per tile in a flat directory.
///
/// Writes go to a uniquely named temporary file that is then renamed over the
/// final name, so readers see either no file or a complete one.
#[derive(Debug, Clone)]
pub struct DiskTileStore {
    directory: PathBuf,
}

impl DiskTileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, key: &TileKey) -> PathBuf {
        self.directory.join(key.file_name())
    }

    fn temp_path_for(&self, key: &TileKey) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.directory
            .join(format!(".{}.{}.{}.tmp", key.file_name(), std::process::id(), n))
    }
}

#[async_trait]
impl TileStore for DiskTileStore {
    async fn get(&self, key: &TileKey) -> Result<Option<Arc<Vec<u8>>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Some(Arc::new(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_if_absent(&self, key: &TileKey, data: Arc<Vec<u8>>) -> Result<bool> {
        let path = self.path_for(key);
        if tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }

        tokio::fs::create_dir_all(&self.directory).await?;
        let temp = self.temp_path_for(key);
        tokio::fs::write(&temp, data.as_slice()).await?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        log::debug!("stored tile {} at {}", key, path.display());
        Ok(true)
    }

    async fn remove(&self, key: &TileKey) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
