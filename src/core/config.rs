//! Configuration for static map rendering
//!
//! Every section has sensible defaults, so callers usually start from
//! `StaticMapConfig::default()` and tweak a few fields, or deserialize a
//! partial JSON document where missing keys fall back to those defaults.

use crate::core::constants::{DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_PADDING, TILE_SIZE};
use crate::layers::style::OverlayStyle;
use crate::tiles::loader::FetchConfig;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMapConfig {
    pub canvas: CanvasConfig,
    /// Tile edge length in pixels, shared by projection, tiling and pasting
    pub tile_size: u32,
    pub candidate_order: CandidateOrder,
    pub style: OverlayStyle,
    pub fetch: FetchConfig,
    pub output_format: OutputFormat,
}

impl Default for StaticMapConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            tile_size: TILE_SIZE,
            candidate_order: CandidateOrder::default(),
            style: OverlayStyle::default(),
            fetch: FetchConfig::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl StaticMapConfig {
    /// Parses a (possibly partial) JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Canvas size limits used by zoom selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Pixels added outward on every side of the geometry extent
    pub padding: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            padding: DEFAULT_PADDING,
        }
    }
}

/// Order in which registered zoom levels are tried during zoom selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// Exactly the order in which zooms were registered
    #[default]
    AsRegistered,
    /// Finest zoom first, regardless of registration order
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticMapConfig::default();
        assert_eq!(config.canvas.max_width, 1200);
        assert_eq!(config.canvas.max_height, 1200);
        assert_eq!(config.canvas.padding, 100);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.candidate_order, CandidateOrder::AsRegistered);
        assert_eq!(config.output_format, OutputFormat::Png);
        assert_eq!(config.style.palette.len(), 6);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{
            "canvas": { "max_width": 640, "padding": 16 },
            "candidate_order": "descending",
            "output_format": "jpeg"
        }"#;
        let config = StaticMapConfig::from_json_str(json).unwrap();

        assert_eq!(config.canvas.max_width, 640);
        assert_eq!(config.canvas.max_height, 1200);
        assert_eq!(config.canvas.padding, 16);
        assert_eq!(config.candidate_order, CandidateOrder::Descending);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.tile_size, 256);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = StaticMapConfig::default();
        config.tile_size = 512;
        config.fetch.max_concurrent = 8;

        let json = config.to_json_string().unwrap();
        assert_eq!(StaticMapConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            StaticMapConfig::from_json_str("{ not json"),
            Err(crate::MapError::Serialization(_))
        ));
    }
}
