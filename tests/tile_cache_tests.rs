use async_trait::async_trait;
use geo_types::line_string;
use image::{Rgba, RgbaImage};
use staticmap::rendering::compositor::covering_tiles;
use staticmap::{
    BoxError, CacheConfig, SourceConfig, StaticMap, TileFetcher, TileProviderConfig,
};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn png_tile(color: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(256, 256, Rgba(color)))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Answers every URL with the same PNG and records what was asked
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

fn cached_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn phoenix_map(config: &TileProviderConfig, fetcher: Arc<CountingFetcher>) -> StaticMap {
    let mut map = StaticMap::default();
    map.set_tile_source(config.build_with_fetcher(fetcher), (8..=17).rev());
    map.add_line(line_string![(x: -111.9, y: 33.38), (x: -112.0, y: 33.43)]);
    map
}

#[cfg(test)]
mod tile_cache_tests {
    use super::*;

    /// A second render over the same disk cache fetches nothing
    #[tokio::test]
    async fn test_disk_cache_is_reused_across_renders() {
        let dir = tempfile::tempdir().unwrap();
        let config = TileProviderConfig::new(
            SourceConfig::Google {
                url_template: "http://tiles.test/{z}/{x}/{y}.png".to_string(),
            },
            CacheConfig::on_disk(dir.path()),
        );
        let fetcher = Arc::new(CountingFetcher::new(png_tile([0, 0, 255, 255])));

        let first = phoenix_map(&config, fetcher.clone());
        let plan = first.zoom_plan().unwrap();
        let tile_count = covering_tiles(&plan, 256).len();

        first.render().await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), tile_count);

        let files = cached_files(dir.path());
        assert_eq!(files.len(), tile_count);
        assert!(files.iter().all(|f| f.starts_with("google_14_") && f.ends_with(".png")));

        // a fresh provider over the same directory serves everything from disk
        let second = phoenix_map(&config, fetcher.clone());
        second.render().await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), tile_count);
        assert_eq!(cached_files(dir.path()), files);
    }

    /// Google URLs carry XYZ rows, matching the cache file names
    #[tokio::test]
    async fn test_google_urls_use_xyz_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = TileProviderConfig::new(
            SourceConfig::Google {
                url_template: "http://tiles.test/{z}/{x}/{y}.png".to_string(),
            },
            CacheConfig::on_disk(dir.path()),
        );
        let fetcher = Arc::new(CountingFetcher::new(png_tile([0, 0, 255, 255])));
        let map = phoenix_map(&config, fetcher.clone());
        map.render().await.unwrap();

        let files = cached_files(dir.path());
        for url in fetcher.urls.lock().unwrap().iter() {
            let path = url.trim_start_matches("http://tiles.test/").trim_end_matches(".png");
            let parts: Vec<&str> = path.split('/').collect();
            let name = format!("google_{}_{}_{}.png", parts[0], parts[1], parts[2]);
            assert!(files.contains(&name), "{} not cached as {}", url, name);
        }

        // Phoenix is in the northern hemisphere, so XYZ rows are in the upper half
        let rows: Vec<u32> = fetcher
            .urls
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.rsplit('/').next().unwrap().trim_end_matches(".png").parse().unwrap())
            .collect();
        assert!(rows.iter().all(|&y| y < (1 << 13)));
    }

    #[tokio::test]
    async fn test_bing_provider_with_memory_cache() {
        let config = TileProviderConfig::new(SourceConfig::bing(), CacheConfig::default());
        let fetcher = Arc::new(CountingFetcher::new(png_tile([200, 200, 200, 255])));
        let provider = config.build_with_fetcher(fetcher.clone());

        let mut map = StaticMap::default();
        map.set_tile_source(provider, [17, 16]);
        map.add_line(line_string![(x: -111.9, y: 33.38), (x: -111.905, y: 33.383)]);
        let rendered = map.render().await.unwrap();
        assert_eq!(rendered.plan.zoom, 17);

        let urls = fetcher.urls.lock().unwrap();
        assert!(!urls.is_empty());
        for url in urls.iter() {
            assert!(url.contains(".ortho.tiles.virtualearth.net/tiles/r"), "{}", url);
            // 17-digit quadkey
            let key = url.split("/tiles/r").nth(1).unwrap().split('.').next().unwrap();
            assert_eq!(key.len(), 17);
            assert!(key.chars().all(|c| ('0'..='3').contains(&c)));
        }
    }
}
