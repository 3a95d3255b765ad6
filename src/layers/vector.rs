//! Vector geometries drawn over the base map.
//!
//! Coordinates follow the `geo-types` convention: `x` is longitude and `y` is
//! latitude, both in degrees.

use crate::core::geo::GeoBounds;
use geo::BoundingRect;
use geo_types::{MultiLineString, MultiPolygon, Point};

/// Any geometry the collector accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// One or more disjoint polylines
    Line(MultiLineString<f64>),
    /// One or more disjoint polygons, each with an exterior and optional holes
    Polygon(MultiPolygon<f64>),
    Marker(Point<f64>),
}

impl Geometry {
    /// Geographic extent, `None` for geometries without coordinates
    pub fn extent(&self) -> Option<GeoBounds> {
        match self {
            Self::Line(line) => line.bounding_rect().map(GeoBounds::from),
            Self::Polygon(polygon) => polygon.bounding_rect().map(GeoBounds::from),
            Self::Marker(point) => Some(GeoBounds::from(point.bounding_rect())),
        }
    }
}

/// Ordered collections of lines, polygons and markers plus their combined extent
#[derive(Debug, Clone, Default)]
pub struct GeometryCollector {
    lines: Vec<MultiLineString<f64>>,
    polygons: Vec<MultiPolygon<f64>>,
    markers: Vec<Point<f64>>,
    bounds: Option<GeoBounds>,
}

impl GeometryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: impl Into<MultiLineString<f64>>) {
        self.lines.push(line.into());
        self.reset_bounds();
    }

    pub fn add_polygon(&mut self, polygon: impl Into<MultiPolygon<f64>>) {
        self.polygons.push(polygon.into());
        self.reset_bounds();
    }

    pub fn add_marker(&mut self, marker: impl Into<Point<f64>>) {
        self.markers.push(marker.into());
        self.reset_bounds();
    }

    pub fn add(&mut self, geometry: Geometry) {
        match geometry {
            Geometry::Line(line) => self.add_line(line),
            Geometry::Polygon(polygon) => self.add_polygon(polygon),
            Geometry::Marker(point) => self.add_marker(point),
        }
    }

    pub fn lines(&self) -> &[MultiLineString<f64>] {
        &self.lines
    }

    pub fn polygons(&self) -> &[MultiPolygon<f64>] {
        &self.polygons
    }

    pub fn markers(&self) -> &[Point<f64>] {
        &self.markers
    }

    /// Smallest box containing every registered geometry, `None` while empty
    pub fn bounding_box(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.lines.len() + self.polygons.len() + self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Full rescan rather than an incremental merge, so the extent always
    // matches the current geometry set.
    fn reset_bounds(&mut self) {
        let lines = self.lines.iter().filter_map(|l| l.bounding_rect());
        let polygons = self.polygons.iter().filter_map(|p| p.bounding_rect());
        let markers = self.markers.iter().map(|m| m.bounding_rect());

        self.bounds = lines
            .chain(polygons)
            .chain(markers)
            .map(GeoBounds::from)
            .reduce(|acc, b| acc.union(&b));
    }
}
