pub mod canvas;
pub mod compositor;
pub mod output;

// Re-export main types
pub use canvas::OverlayPainter;
pub use compositor::{covering_tiles, TilePlacement};
pub use output::RenderedMap;
