//! Spherical mercator math shared by zoom selection, tiling and drawing.
//!
//! Four coordinate spaces are involved:
//!
//! * geographic degrees ([`LatLng`]),
//! * projected meters ([`MetersPoint`]),
//! * global pixels at a zoom ([`PixelPoint`], origin bottom-left, `y` north),
//! * tile indices ([`TileCoord`], TMS row order).
//!
//! Every conversion goes through [`GlobalMercator`] so that all callers agree
//! on a single tile size.

use crate::core::constants::{ORIGIN_SHIFT, TILE_SIZE};
use crate::core::geo::{LatLng, MetersPoint, PixelPoint, TileCoord};
use crate::{MapError, Result};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalMercator {
    tile_size: u32,
    initial_resolution: f64,
}

impl GlobalMercator {
    pub fn new(tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        Self {
            tile_size,
            initial_resolution: 2.0 * ORIGIN_SHIFT / tile_size as f64,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Converts WGS84 degrees to mercator meters.
    ///
    /// Latitudes at or beyond the mercator cut-off are rejected rather than
    /// clamped, so a bad input never silently moves to the edge of the map.
    pub fn geo_to_meters(&self, lat: f64, lng: f64) -> Result<MetersPoint> {
        if !LatLng::new(lat, lng).is_projectable() {
            return Err(MapError::OutOfRange { lat, lon: lng });
        }

        let x = lng * ORIGIN_SHIFT / 180.0;
        let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
        Ok(MetersPoint::new(x, y * ORIGIN_SHIFT / 180.0))
    }

    /// Converts mercator meters back to WGS84 degrees.
    pub fn meters_to_geo(&self, meters: MetersPoint) -> LatLng {
        let lng = meters.x / ORIGIN_SHIFT * 180.0;
        let lat = meters.y / ORIGIN_SHIFT * 180.0;
        let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
        LatLng::new(lat, lng)
    }

    /// Meters per pixel at the given zoom
    pub fn resolution(&self, zoom: u8) -> f64 {
        self.initial_resolution / 2_f64.powi(zoom as i32)
    }

    pub fn meters_to_pixels(&self, meters: MetersPoint, zoom: u8) -> PixelPoint {
        let res = self.resolution(zoom);
        PixelPoint::new(
            (meters.x + ORIGIN_SHIFT) / res,
            (meters.y + ORIGIN_SHIFT) / res,
        )
    }

    pub fn pixels_to_meters(&self, pixels: PixelPoint, zoom: u8) -> MetersPoint {
        let res = self.resolution(zoom);
        MetersPoint::new(
            pixels.x * res - ORIGIN_SHIFT,
            pixels.y * res - ORIGIN_SHIFT,
        )
    }

    /// Shorthand for `geo_to_meters` followed by `meters_to_pixels`
    pub fn geo_to_pixels(&self, lat: f64, lng: f64, zoom: u8) -> Result<PixelPoint> {
        Ok(self.meters_to_pixels(self.geo_to_meters(lat, lng)?, zoom))
    }

    /// Index of the tile containing an integer pixel; may fall outside the world grid.
    pub fn pixels_to_tile(&self, px: i64, py: i64) -> (i64, i64) {
        let size = self.tile_size as i64;
        (px.div_euclid(size), py.div_euclid(size))
    }

    /// Flips the tile row between TMS (south origin) and XYZ (north origin) order.
    ///
    /// The flip is its own inverse. Only tile providers call this, when turning
    /// a canonical coordinate into a request.
    pub fn google_tile(coord: TileCoord) -> TileCoord {
        let rows = TileCoord::tiles_per_axis(coord.z);
        let y = (rows - 1).saturating_sub(coord.y as u64) as u32;
        TileCoord::new(coord.x, y, coord.z)
    }

    /// Encodes an XYZ tile as a base-4 quadkey, most significant level first.
    ///
    /// Each digit is `bit(x) + 2 * bit(y)` for the corresponding level.
    pub fn quad_key(coord: TileCoord) -> String {
        let mut key = String::with_capacity(coord.z as usize);
        for level in (1..=coord.z).rev() {
            // levels past the width of a u32 index contribute zero bits
            let mask = 1u64.checked_shl(level as u32 - 1).unwrap_or(0);
            let mut digit = b'0';
            if coord.x as u64 & mask != 0 {
                digit += 1;
            }
            if coord.y as u64 & mask != 0 {
                digit += 2;
            }
            key.push(digit as char);
        }
        key
    }
}

impl Default for GlobalMercator {
    fn default() -> Self {
        Self::new(TILE_SIZE)
    }
}
