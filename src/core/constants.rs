//! Core constants for the spherical-mercator tiling scheme and renderer defaults.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Equatorial radius of the WGS84 sphere used by web mercator, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the map width in meters (`π · R`); meters range over `[-ORIGIN_SHIFT, ORIGIN_SHIFT]`.
pub const ORIGIN_SHIFT: f64 = std::f64::consts::PI * EARTH_RADIUS;

/// Latitude at which the mercator square is cut off.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Highest zoom level a tile index can address (tile indices are `u32`).
pub const MAX_ZOOM: u8 = 30;

/// Default maximum canvas size in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1200;
pub const DEFAULT_MAX_HEIGHT: u32 = 1200;

/// Largest canvas a render will allocate, in pixels (1 GiB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 16_384 * 16_384;

/// Default padding added around the geometry extent, in pixels.
pub const DEFAULT_PADDING: u32 = 100;

/// Default number of tile fetches in flight during one render.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;
