pub mod style;
pub mod vector;

pub use style::{Color, LineStyle, OverlayStyle, PointStyle, PolygonStyle};
pub use vector::{Geometry, GeometryCollector};
