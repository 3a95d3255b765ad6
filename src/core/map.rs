use crate::{
    core::{
        config::StaticMapConfig,
        geo::GeoBounds,
        projection::GlobalMercator,
        zoom::{select_zoom, ZoomPlan},
    },
    layers::vector::{Geometry, GeometryCollector},
    prelude::Arc,
    rendering::{canvas::paint_overlays, compositor::compose_base_map, output::RenderedMap},
    tiles::{provider::TileProvider, registry::ZoomTileSourceRegistry},
    MapError, Result,
};
use futures::future::{AbortRegistration, Abortable};
use geo_types::{MultiLineString, MultiPolygon, Point};
use std::path::Path;

/// Static map builder: collects geometry, picks a zoom and renders a raster.
///
/// The zoom plan is derived from the current geometry and tile sources each
/// time it is needed, so it can never be stale.
#[derive(Debug)]
pub struct StaticMap {
    config: StaticMapConfig,
    mercator: GlobalMercator,
    registry: ZoomTileSourceRegistry,
    geometries: GeometryCollector,
}

impl Default for StaticMap {
    fn default() -> Self {
        Self::new(StaticMapConfig::default())
    }
}

impl StaticMap {
    pub fn new(config: StaticMapConfig) -> Self {
        Self {
            mercator: GlobalMercator::new(config.tile_size),
            config,
            registry: ZoomTileSourceRegistry::new(),
            geometries: GeometryCollector::new(),
        }
    }

    /// Serves `zooms` from `provider`. Registration order is the candidate
    /// order used by zoom selection unless the config asks for descending.
    pub fn set_tile_source(&mut self, provider: Arc<dyn TileProvider>, zooms: impl IntoIterator<Item = u8>) {
        self.registry.register(provider, zooms);
    }

    pub fn add_line(&mut self, line: impl Into<MultiLineString<f64>>) {
        self.geometries.add_line(line);
    }

    pub fn add_polygon(&mut self, polygon: impl Into<MultiPolygon<f64>>) {
        self.geometries.add_polygon(polygon);
    }

    pub fn add_marker(&mut self, marker: impl Into<Point<f64>>) {
        self.geometries.add_marker(marker);
    }

    pub fn add(&mut self, geometry: Geometry) {
        self.geometries.add(geometry);
    }

    pub fn bounding_box(&self) -> Option<GeoBounds> {
        self.geometries.bounding_box()
    }

    pub fn zoom_plan(&self) -> Result<ZoomPlan> {
        let bounds = self.bounding_box().ok_or(MapError::EmptyGeometry)?;
        let candidates = self.registry.candidates(self.config.candidate_order);
        select_zoom(&self.mercator, &bounds, &candidates, &self.config.canvas)
    }

    /// Where a geographic position lands on the canvas of the current plan
    pub fn canvas_position(&self, lat: f64, lon: f64) -> Result<(f64, f64)> {
        self.zoom_plan()?.geo_to_canvas(&self.mercator, lat, lon)
    }

    pub async fn render(&self) -> Result<RenderedMap> {
        let plan = self.zoom_plan()?;
        let base = compose_base_map(
            &plan,
            &self.registry,
            self.config.tile_size,
            self.config.fetch.concurrency(),
        )
        .await?;
        let image = paint_overlays(&base, &self.geometries, &plan, &self.mercator, &self.config.style)?;
        log::info!(
            "rendered {} geometries on a {}x{} canvas at zoom {}",
            self.geometries.len(),
            plan.width,
            plan.height,
            plan.zoom
        );
        Ok(RenderedMap::new(image, plan))
    }

    /// Like [`render`](Self::render), but stops as soon as the paired
    /// `AbortHandle` fires. In-flight tile fetches are dropped.
    pub async fn render_with_cancel(&self, registration: AbortRegistration) -> Result<RenderedMap> {
        match Abortable::new(self.render(), registration).await {
            Ok(result) => result,
            Err(_aborted) => {
                log::info!("render cancelled");
                Err(MapError::Cancelled)
            }
        }
    }

    /// Renders and writes the image in the configured output format
    pub async fn render_to_file(&self, path: impl AsRef<Path>) -> Result<RenderedMap> {
        let rendered = self.render().await?;
        let bytes = rendered.encode(self.config.output_format)?;
        tokio::fs::write(path.as_ref(), bytes).await?;
        log::info!("wrote map to {}", path.as_ref().display());
        Ok(rendered)
    }

    pub fn config(&self) -> &StaticMapConfig {
        &self.config
    }

    pub fn mercator(&self) -> &GlobalMercator {
        &self.mercator
    }

    pub fn registry(&self) -> &ZoomTileSourceRegistry {
        &self.registry
    }

    pub fn geometries(&self) -> &GeometryCollector {
        &self.geometries
    }
}
