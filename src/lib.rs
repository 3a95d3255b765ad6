//! # staticmap
//!
//! Renders static raster maps of vector geometry over stitched web-mercator
//! tiles.
//!
//! Geometry is collected on a [`StaticMap`], which picks the finest registered
//! zoom whose pixel extent fits the configured canvas, fetches and caches the
//! covering tiles from the provider registered for that zoom, and paints
//! lines, polygons and markers on top.

pub mod core;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::PixelBounds,
    config::{CandidateOrder, CanvasConfig, OutputFormat, StaticMapConfig},
    geo::{GeoBounds, LatLng, MetersPoint, PixelPoint, TileCoord},
    map::StaticMap,
    projection::GlobalMercator,
    zoom::{select_zoom, ZoomPlan},
};

pub use crate::layers::{
    style::{Color, LineStyle, OverlayStyle, PointStyle, PolygonStyle},
    vector::{Geometry, GeometryCollector},
};

pub use crate::tiles::{
    cache::{DiskTileStore, MemoryTileStore, TileKey, TileStore},
    loader::{FetchConfig, HttpFetcher, TileFetcher},
    provider::{CacheConfig, CachedTileProvider, TileProvider, TileProviderConfig},
    registry::ZoomTileSourceRegistry,
    source::{BingLayer, BingSource, GoogleSource, SourceConfig, TileSource},
};

pub use crate::rendering::output::RenderedMap;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Boxed transport error returned by [`TileFetcher`] implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("coordinate out of projectable range: lat {lat}, lon {lon}")]
    OutOfRange { lat: f64, lon: f64 },

    #[error("no tile source registered for zoom {0}")]
    UnregisteredZoom(u8),

    #[error("zoom {0} is above the highest supported zoom")]
    ZoomOutOfRange(u8),

    #[error("no zoom levels registered")]
    NoZoomLevels,

    #[error("failed to fetch tile {key}")]
    TileFetch {
        key: TileKey,
        #[source]
        source: BoxError,
    },

    #[error("failed to decode tile {key}")]
    TileDecode {
        key: TileKey,
        #[source]
        source: image::ImageError,
    },

    #[error("no geometry to render")]
    EmptyGeometry,

    #[error("render aborted at tile {tile}")]
    RenderAborted {
        tile: TileCoord,
        #[source]
        source: Box<MapError>,
    },

    #[error("render cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),
}

/// Error type alias for convenience
pub type Error = MapError;
