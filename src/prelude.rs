//! Prelude module for common staticmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use staticmap::prelude::*;`

pub use crate::core::{
    bounds::PixelBounds,
    config::{CandidateOrder, CanvasConfig, OutputFormat, StaticMapConfig},
    geo::{GeoBounds, LatLng, TileCoord},
    map::StaticMap,
    projection::GlobalMercator,
    zoom::ZoomPlan,
};

pub use crate::layers::{
    style::{Color, OverlayStyle},
    vector::{Geometry, GeometryCollector},
};

pub use crate::tiles::{
    cache::{DiskTileStore, MemoryTileStore, TileStore},
    loader::{FetchConfig, TileFetcher},
    provider::{CacheConfig, TileProvider, TileProviderConfig},
    source::{BingLayer, SourceConfig, TileSource},
};

pub use crate::rendering::output::RenderedMap;

pub use crate::{Error as MapError, Result};

pub use std::sync::{Arc, Mutex};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
