//! Zoom selection: pick the first candidate zoom at which the geometry extent
//! fits the canvas limits, then pad the pixel box and derive the canvas size.

use crate::core::bounds::PixelBounds;
use crate::core::config::CanvasConfig;
use crate::core::constants::MAX_ZOOM;
use crate::core::geo::{GeoBounds, LatLng, PixelPoint};
use crate::core::projection::GlobalMercator;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Result of zoom selection for one geometry set.
///
/// Immutable once computed; a new plan is derived whenever geometry or the
/// tile-source registry changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomPlan {
    pub zoom: u8,
    /// Padded canvas box in global pixels at `zoom`
    pub bounds: PixelBounds,
    pub width: u32,
    pub height: u32,
    /// Geographic position of the padded lower-left corner
    pub lower_left: LatLng,
    /// True when no candidate fit and the last one was used anyway
    pub overflow: bool,
}

impl ZoomPlan {
    /// Maps a global pixel to canvas coordinates (origin top-left, `y` down)
    pub fn pixel_to_canvas(&self, pixel: PixelPoint) -> (f64, f64) {
        (
            pixel.x - self.bounds.min_x as f64,
            self.bounds.max_y as f64 - pixel.y,
        )
    }

    /// Maps a geographic coordinate to canvas coordinates
    pub fn geo_to_canvas(&self, mercator: &GlobalMercator, lat: f64, lng: f64) -> Result<(f64, f64)> {
        let pixel = mercator.geo_to_pixels(lat, lng, self.zoom)?;
        Ok(self.pixel_to_canvas(pixel))
    }
}

/// Chooses a zoom for `bounds` from `candidates`, tried in the given order.
///
/// A candidate is accepted when the unpadded pixel extent is strictly smaller
/// than the configured maximum in both axes. When none is accepted the last
/// candidate is used and the plan is flagged as `overflow`; the canvas may
/// then exceed the configured limits. Candidates above [`MAX_ZOOM`] are
/// rejected with [`MapError::ZoomOutOfRange`].
pub fn select_zoom(
    mercator: &GlobalMercator,
    bounds: &GeoBounds,
    candidates: &[u8],
    canvas: &CanvasConfig,
) -> Result<ZoomPlan> {
    let Some(&last) = candidates.last() else {
        return Err(MapError::NoZoomLevels);
    };
    if let Some(&zoom) = candidates.iter().find(|&&z| z > MAX_ZOOM) {
        return Err(MapError::ZoomOutOfRange(zoom));
    }

    let ur_m = mercator.geo_to_meters(bounds.north_east.lat, bounds.north_east.lng)?;
    let ll_m = mercator.geo_to_meters(bounds.south_west.lat, bounds.south_west.lng)?;

    let mut chosen = None;
    for &zoom in candidates {
        let ur = mercator.meters_to_pixels(ur_m, zoom);
        let ll = mercator.meters_to_pixels(ll_m, zoom);

        if (ur.x - ll.x) < canvas.max_width as f64 && (ur.y - ll.y) < canvas.max_height as f64 {
            chosen = Some((zoom, ur, ll));
            break;
        }
    }

    let overflow = chosen.is_none();
    let (zoom, ur, ll) = chosen.unwrap_or_else(|| {
        (
            last,
            mercator.meters_to_pixels(ur_m, last),
            mercator.meters_to_pixels(ll_m, last),
        )
    });

    if overflow {
        log::warn!(
            "no candidate zoom fits {}x{}, falling back to zoom {}",
            canvas.max_width,
            canvas.max_height,
            zoom
        );
    }

    let (ll_x, ll_y) = ll.floor();
    let (ur_x, ur_y) = ur.floor();
    let padded = PixelBounds::new(ll_x, ll_y, ur_x, ur_y).expanded(canvas.padding as i64);

    let anchor = mercator.pixels_to_meters(
        PixelPoint::new(padded.min_x as f64, padded.min_y as f64),
        zoom,
    );

    let (width, height) = match (u32::try_from(padded.width()), u32::try_from(padded.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(MapError::Render(format!(
                "canvas {}x{} at zoom {} does not fit a raster",
                padded.width(),
                padded.height(),
                zoom
            )))
        }
    };

    let plan = ZoomPlan {
        zoom,
        bounds: padded,
        width,
        height,
        lower_left: mercator.meters_to_geo(anchor),
        overflow,
    };

    log::debug!(
        "zoom plan: z{} canvas {}x{} (overflow: {})",
        plan.zoom,
        plan.width,
        plan.height,
        plan.overflow
    );

    Ok(plan)
}
