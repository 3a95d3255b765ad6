//! Base-map assembly: work out which tiles cover a [`ZoomPlan`], fetch them with
//! bounded concurrency and paste each at its canvas offset.

use crate::core::constants::MAX_CANVAS_PIXELS;
use crate::core::geo::TileCoord;
use crate::core::projection::GlobalMercator;
use crate::core::zoom::ZoomPlan;
use crate::tiles::registry::ZoomTileSourceRegistry;
use crate::{MapError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use image::{imageops, Rgba, RgbaImage};

/// Background showing through where no tile was pasted
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// One tile of the base map and where its top-left corner lands on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    pub offset_x: i64,
    pub offset_y: i64,
}

/// Tiles needed to fill the canvas of `plan`.
///
/// Columns and rows start at the tile containing the lower-left corner and
/// run while the tile origin is at most one tile past the upper-right corner,
/// which adds one tile of overscan on the upper bound. Indices outside the
/// world grid are dropped. Placements come out column by column, south to north.
pub fn covering_tiles(plan: &ZoomPlan, tile_size: u32) -> Vec<TilePlacement> {
    let mercator = GlobalMercator::new(tile_size);
    let size = mercator.tile_size() as i64;
    let bounds = plan.bounds;

    let (start_x, start_y) = mercator.pixels_to_tile(bounds.min_x, bounds.min_y);
    let (end_x, end_y) = mercator.pixels_to_tile(bounds.max_x + size, bounds.max_y + size);

    let mut placements = Vec::new();
    for tx in start_x..=end_x {
        for ty in start_y..=end_y {
            let Some(coord) = TileCoord::checked(tx, ty, plan.zoom) else {
                log::debug!("skipping out-of-world tile {}/{}/{}", plan.zoom, tx, ty);
                continue;
            };
            placements.push(TilePlacement {
                coord,
                offset_x: tx * size - bounds.min_x,
                // tile rows count northward, canvas rows count down from the top
                offset_y: bounds.max_y - ty * size - size,
            });
        }
    }
    placements
}

/// Rejects canvases whose RGBA buffer would overflow or exceed [`MAX_CANVAS_PIXELS`]
pub fn check_canvas_size(plan: &ZoomPlan) -> Result<()> {
    let pixels = u64::from(plan.width) * u64::from(plan.height);
    let fits = pixels <= MAX_CANVAS_PIXELS
        && pixels
            .checked_mul(4)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .is_some();
    if fits {
        return Ok(());
    }
    Err(MapError::Render(format!(
        "canvas {}x{} at zoom {} exceeds the {} pixel limit",
        plan.width, plan.height, plan.zoom, MAX_CANVAS_PIXELS
    )))
}

/// Builds the base-map canvas for `plan`.
///
/// Canvases larger than [`MAX_CANVAS_PIXELS`] fail with [`MapError::Render`]
/// before any tile is requested. Tiles are fetched concurrently, at most `max_concurrent` at a time. The
/// first failure aborts the whole composite; dropping the returned future
/// cancels every fetch still in flight.
pub async fn compose_base_map(
    plan: &ZoomPlan,
    registry: &ZoomTileSourceRegistry,
    tile_size: u32,
    max_concurrent: usize,
) -> Result<RgbaImage> {
    check_canvas_size(plan)?;
    let provider = registry.provider_for(plan.zoom)?;
    let placements = covering_tiles(plan, tile_size);

    log::info!(
        "composing {}x{} canvas at zoom {} from {} {} tiles",
        plan.width,
        plan.height,
        plan.zoom,
        placements.len(),
        provider.kind()
    );

    let mut canvas = RgbaImage::from_pixel(plan.width, plan.height, BACKGROUND);

    let mut fetched = stream::iter(placements)
        .map(|placement| async move {
            provider
                .get_tile(placement.coord)
                .await
                .map(|tile| (placement, tile))
                .map_err(|e| MapError::RenderAborted {
                    tile: placement.coord,
                    source: Box::new(e),
                })
        })
        .buffer_unordered(max_concurrent.max(1));

    // tiles never overlap; paste order is irrelevant
    while let Some((placement, tile)) = fetched.try_next().await? {
        let tile = fit_to_tile_size(tile, tile_size);
        imageops::replace(&mut canvas, &tile, placement.offset_x, placement.offset_y);
    }

    Ok(canvas)
}

fn fit_to_tile_size(tile: RgbaImage, tile_size: u32) -> RgbaImage {
    if tile.width() == tile_size && tile.height() == tile_size {
        return tile;
    }
    log::warn!(
        "resizing {}x{} tile to {}x{}",
        tile.width(),
        tile.height(),
        tile_size,
        tile_size
    );
    imageops::resize(&tile, tile_size, tile_size, imageops::FilterType::Triangle)
}
