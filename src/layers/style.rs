use serde::{Deserialize, Serialize};

/// Serializable RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with its alpha replaced
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl From<Color> for tiny_skia::Color {
    fn from(color: Color) -> Self {
        tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Fill colors cycled across successive polygon rings
pub const DEFAULT_PALETTE: [Color; 6] = [
    Color::rgb(141, 211, 199),
    Color::rgb(255, 255, 179),
    Color::rgb(190, 186, 218),
    Color::rgb(251, 128, 114),
    Color::rgb(128, 177, 211),
    Color::rgb(253, 180, 98),
];

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
    /// Stroke opacity, 0 (transparent) to 255 (opaque)
    pub opacity: u8,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(255, 0, 0),
            width: 4.0,
            opacity: 150,
        }
    }
}

/// Style for polygon rings; the colors come from the palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonStyle {
    pub stroke_width: f32,
    pub fill_opacity: u8,
    pub stroke_opacity: u8,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            stroke_width: 4.0,
            fill_opacity: 100,
            stroke_opacity: 100,
        }
    }
}

/// Style for markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub radius: f32,
    pub opacity: u8,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            fill_color: Color::rgb(255, 0, 0),
            stroke_color: Color::rgb(255, 255, 255),
            stroke_width: 2.0,
            radius: 6.0,
            opacity: 255,
        }
    }
}

/// Combined style for everything drawn over the base map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub line: LineStyle,
    pub polygon: PolygonStyle,
    pub marker: PointStyle,
    pub palette: Vec<Color>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line: LineStyle::default(),
            polygon: PolygonStyle::default(),
            marker: PointStyle::default(),
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl OverlayStyle {
    /// Palette entry for the n-th drawn ring, wrapping around
    pub fn palette_color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()];
        }
        self.palette[index % self.palette.len()]
    }
}
