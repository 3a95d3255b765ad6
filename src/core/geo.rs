use crate::core::constants::MAX_LATITUDE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinate can be projected to web mercator
    pub fn is_projectable(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() < MAX_LATITUDE
            && self.lng >= -180.0
            && self.lng <= 180.0
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A point in spherical-mercator projected meters (EPSG:3857)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetersPoint {
    pub x: f64,
    pub y: f64,
}

impl MetersPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in global pixel space at a particular zoom.
///
/// The origin is the bottom-left corner of the world and `y` grows northward,
/// matching meters. Conversion to image rows happens only when placing pixels
/// on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn floor(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }
}

/// Geographic bounding box, accumulated over registered geometries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl GeoBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from `(min-lon, min-lat, max-lon, max-lat)`
    pub fn from_extent(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self::new(LatLng::new(min_lat, min_lng), LatLng::new(max_lat, max_lng))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Returns the union of this bounds with another bounds
    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        let south = self.south_west.lat.min(other.south_west.lat);
        let west = self.south_west.lng.min(other.south_west.lng);
        let north = self.north_east.lat.max(other.north_east.lat);
        let east = self.north_east.lng.max(other.north_east.lng);

        GeoBounds::new(LatLng::new(south, west), LatLng::new(north, east))
    }
}

impl From<geo_types::Rect<f64>> for GeoBounds {
    fn from(rect: geo_types::Rect<f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        Self::from_extent(min.x, min.y, max.x, max.y)
    }
}

/// Represents a tile coordinate.
///
/// Inside the crate tile rows are counted from the south (TMS); providers
/// convert to the XYZ row order with [`GlobalMercator::google_tile`] when
/// they build requests.
///
/// [`GlobalMercator::google_tile`]: crate::core::projection::GlobalMercator::google_tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along one axis at this zoom, saturating past 63
    pub fn tiles_per_axis(z: u8) -> u64 {
        1u64.checked_shl(z as u32).unwrap_or(u64::MAX)
    }

    /// Builds a coordinate from signed indices, rejecting anything outside the world grid
    pub fn checked(x: i64, y: i64, z: u8) -> Option<Self> {
        let n = i64::try_from(Self::tiles_per_axis(z)).unwrap_or(i64::MAX);
        if (0..n).contains(&x) && (0..n).contains(&y) {
            Some(Self::new(x as u32, y as u32, z))
        } else {
            None
        }
    }

    /// Checks if the tile is valid for the given zoom level
    pub fn is_valid(&self) -> bool {
        let n = Self::tiles_per_axis(self.z);
        (self.x as u64) < n && (self.y as u64) < n
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
