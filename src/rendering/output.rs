use crate::core::config::OutputFormat;
use crate::core::zoom::ZoomPlan;
use crate::Result;
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// A finished map: the raster plus the plan it was drawn with
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub image: RgbaImage,
    pub plan: ZoomPlan,
}

impl RenderedMap {
    pub fn new(image: RgbaImage, plan: ZoomPlan) -> Self {
        Self { image, plan }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encoded image bytes. JPEG output drops the alpha channel.
    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>> {
        let image = match format {
            OutputFormat::Png => DynamicImage::ImageRgba8(self.image.clone()),
            OutputFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.image.clone()).to_rgb8()),
        };
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
        Ok(bytes)
    }

    pub fn save(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
        let bytes = self.encode(format)?;
        std::fs::write(path.as_ref(), bytes)?;
        log::info!("wrote {}x{} map to {}", self.width(), self.height(), path.as_ref().display());
        Ok(())
    }
}
