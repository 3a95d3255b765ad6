use super::cache::{DiskTileStore, MemoryTileStore, TileKey, TileStore};
use super::loader::{FetchConfig, HttpFetcher, TileFetcher};
use super::source::{SourceConfig, TileSource};
use crate::core::geo::TileCoord;
use crate::prelude::Arc;
use crate::{MapError, Result};
use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Serves decoded base-map tiles for canonical tile coordinates
#[async_trait]
pub trait TileProvider: Send + Sync {
    /// Cache namespace of this provider
    fn kind(&self) -> &'static str;

    async fn get_tile(&self, coord: TileCoord) -> Result<RgbaImage>;
}

/// A [`TileSource`] backed by a [`TileStore`], fetching through a [`TileFetcher`] on miss
pub struct CachedTileProvider {
    source: Box<dyn TileSource>,
    store: Arc<dyn TileStore>,
    fetcher: Arc<dyn TileFetcher>,
}

impl CachedTileProvider {
    pub fn new(
        source: Box<dyn TileSource>,
        store: Arc<dyn TileStore>,
        fetcher: Arc<dyn TileFetcher>,
    ) -> Self {
        Self {
            source,
            store,
            fetcher,
        }
    }

    pub fn key_for(&self, coord: TileCoord) -> TileKey {
        TileKey::new(self.source.kind(), self.source.cache_coord(coord))
    }

    /// Fetches and stores a tile; the flag tells whether this call wrote the entry
    async fn download(&self, key: &TileKey, coord: TileCoord) -> Result<(Arc<Vec<u8>>, bool)> {
        let url = self.source.url(coord);
        log::debug!("cache miss for {}, fetching {}", key, url);

        let data = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| MapError::TileFetch { key: *key, source })?;

        let data = Arc::new(data);
        let written = self.store.put_if_absent(key, Arc::clone(&data)).await?;
        Ok((data, written))
    }
}

fn decode(key: &TileKey, data: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(data)
        .map(|img| img.to_rgba8())
        .map_err(|source| MapError::TileDecode { key: *key, source })
}

#[async_trait]
impl TileProvider for CachedTileProvider {
    fn kind(&self) -> &'static str {
        self.source.kind()
    }

    async fn get_tile(&self, coord: TileCoord) -> Result<RgbaImage> {
        self.source.on_request();
        let key = self.key_for(coord);

        if let Some(cached) = self.store.get(&key).await? {
            match decode(&key, &cached) {
                Ok(tile) => {
                    log::debug!("cache hit for {}", key);
                    return Ok(tile);
                }
                Err(e) => {
                    log::warn!("discarding corrupt cached tile {}: {}", key, e);
                    self.store.remove(&key).await?;
                }
            }
        }

        let (data, written) = self.download(&key, coord).await?;
        match decode(&key, &data) {
            Ok(tile) => Ok(tile),
            Err(e) => {
                // keep the bad bytes out of the cache so the next render refetches;
                // an entry stored by another writer is left alone
                if written {
                    self.store.remove(&key).await?;
                }
                Err(e)
            }
        }
    }
}

/// Where a configured provider keeps its tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory for the on-disk cache; `None` keeps tiles in memory only
    pub directory: Option<PathBuf>,
    /// Capacity of the in-memory store, in tiles
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            memory_capacity: 1024,
        }
    }
}

impl CacheConfig {
    pub fn on_disk(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    pub fn build(&self) -> Arc<dyn TileStore> {
        match &self.directory {
            Some(dir) => Arc::new(DiskTileStore::new(dir.clone())),
            None => Arc::new(MemoryTileStore::new(self.memory_capacity)),
        }
    }
}

/// Full description of a tile provider, buildable from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileProviderConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl TileProviderConfig {
    pub fn new(source: SourceConfig, cache: CacheConfig) -> Self {
        Self {
            source,
            cache,
            fetch: FetchConfig::default(),
        }
    }

    /// Builds a provider that fetches over HTTP
    pub fn build(&self) -> Arc<dyn TileProvider> {
        self.build_with_fetcher(Arc::new(HttpFetcher::new(self.fetch.clone())))
    }

    pub fn build_with_fetcher(&self, fetcher: Arc<dyn TileFetcher>) -> Arc<dyn TileProvider> {
        Arc::new(CachedTileProvider::new(
            self.source.build(),
            self.cache.build(),
            fetcher,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::GlobalMercator;
    use crate::tiles::source::{BingLayer, BingSource, GoogleSource};
    use crate::BoxError;
    use image::Rgba;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn png_tile(color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(256, 256, Rgba(color));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct CountingFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
    }

    impl CountingFetcher {
        fn new(body: Vec<u8>) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TileFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl TileFetcher for FailingFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<Vec<u8>, BoxError> {
            Err("connection reset".into())
        }
    }

    fn google_provider(store: Arc<dyn TileStore>, fetcher: Arc<dyn TileFetcher>) -> CachedTileProvider {
        CachedTileProvider::new(
            Box::new(GoogleSource::with_template("http://t/{z}/{x}/{y}")),
            store,
            fetcher,
        )
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let fetcher = Arc::new(CountingFetcher::new(png_tile([0, 0, 255, 255])));
        let provider = google_provider(Arc::new(MemoryTileStore::new(8)), fetcher.clone());

        let first = provider.get_tile(TileCoord::new(3, 5, 3)).await.unwrap();
        let second = provider.get_tile(TileCoord::new(3, 5, 3)).await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.as_raw(), second.as_raw());
        assert_eq!(fetcher.urls.lock().unwrap()[0], "http://t/3/3/2");
    }

    #[tokio::test]
    async fn test_fetch_failure_names_the_tile() {
        let provider = google_provider(Arc::new(MemoryTileStore::new(8)), Arc::new(FailingFetcher));

        match provider.get_tile(TileCoord::new(3, 5, 3)).await {
            Err(MapError::TileFetch { key, .. }) => {
                assert_eq!(key, TileKey::new("google", TileCoord::new(3, 2, 3)));
            }
            other => panic!("expected TileFetch, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_undecodable_download_is_not_cached() {
        let store = Arc::new(MemoryTileStore::new(8));
        let fetcher = Arc::new(CountingFetcher::new(b"<html>rate limited</html>".to_vec()));
        let provider = google_provider(store.clone(), fetcher.clone());

        let result = provider.get_tile(TileCoord::new(1, 1, 2)).await;
        assert!(matches!(result, Err(MapError::TileDecode { .. })));
        assert!(store.is_empty());
    }

    /// Stores a valid tile under `key` while its own download is in flight, then returns garbage
    struct RacingFetcher {
        store: Arc<MemoryTileStore>,
        key: TileKey,
        winner: Vec<u8>,
    }

    #[async_trait]
    impl TileFetcher for RacingFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<Vec<u8>, BoxError> {
            self.store
                .put_if_absent(&self.key, Arc::new(self.winner.clone()))
                .await
                .unwrap();
            Ok(b"<html>rate limited</html>".to_vec())
        }
    }

    #[tokio::test]
    async fn test_failed_decode_keeps_entry_written_by_another_fetch() {
        let store = Arc::new(MemoryTileStore::new(8));
        let coord = TileCoord::new(1, 1, 2);
        let key = TileKey::new("google", GlobalMercator::google_tile(coord));
        let fetcher = Arc::new(RacingFetcher {
            store: store.clone(),
            key,
            winner: png_tile([5, 6, 7, 255]),
        });
        let provider = google_provider(store.clone(), fetcher);
        assert_eq!(provider.key_for(coord), key);

        let result = provider.get_tile(coord).await;
        assert!(matches!(result, Err(MapError::TileDecode { .. })));

        let kept = store.get(&key).await.unwrap().unwrap();
        assert!(image::load_from_memory(&kept).is_ok());
    }

    /// Cache hits move the Bing mirror rotation along too
    #[tokio::test]
    async fn test_bing_rotation_advances_on_cache_hits() {
        let fetcher = Arc::new(CountingFetcher::new(png_tile([1, 1, 1, 255])));
        let provider = CachedTileProvider::new(
            Box::new(BingSource::with_servers(BingLayer::Road, 4, 1)),
            Arc::new(MemoryTileStore::new(8)),
            fetcher.clone(),
        );

        provider.get_tile(TileCoord::new(0, 0, 1)).await.unwrap();
        provider.get_tile(TileCoord::new(0, 0, 1)).await.unwrap();
        provider.get_tile(TileCoord::new(1, 0, 1)).await.unwrap();

        let urls = fetcher.urls.lock().unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].starts_with("http://r1."), "{}", urls[0]);
        assert!(urls[1].starts_with("http://r3."), "{}", urls[1]);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_refetched() {
        let store = Arc::new(MemoryTileStore::new(8));
        let fetcher = Arc::new(CountingFetcher::new(png_tile([10, 20, 30, 255])));
        let provider = google_provider(store.clone(), fetcher.clone());

        let key = provider.key_for(TileCoord::new(0, 0, 1));
        store.put_if_absent(&key, Arc::new(vec![0x89, b'P', b'N'])).await.unwrap();

        let tile = provider.get_tile(TileCoord::new(0, 0, 1)).await.unwrap();
        assert_eq!(tile.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let stored = store.get(&key).await.unwrap().unwrap();
        assert!(image::load_from_memory(&stored).is_ok());
    }

    #[test]
    fn test_provider_config_from_json() {
        let config: TileProviderConfig = serde_json::from_str(
            r#"{ "source": { "kind": "google" }, "cache": { "directory": "/tmp/tiles" } }"#,
        )
        .unwrap();
        assert_eq!(config.cache.directory, Some(PathBuf::from("/tmp/tiles")));
        assert_eq!(config.cache.memory_capacity, 1024);
        assert_eq!(config.build().kind(), "google");
    }
}
