pub mod cache;
pub mod loader;
pub mod provider;
pub mod registry;
pub mod source;

// Re-exports for convenience
pub use cache::{DiskTileStore, MemoryTileStore, TileKey, TileStore};
pub use loader::{FetchConfig, HttpFetcher, TileFetcher};
pub use provider::{CacheConfig, CachedTileProvider, TileProvider, TileProviderConfig};
pub use registry::ZoomTileSourceRegistry;
pub use source::{BingLayer, BingSource, GoogleSource, SourceConfig, TileSource};
