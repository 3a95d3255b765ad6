//! Vector overlay painting on top of the composed base map.

use crate::core::projection::GlobalMercator;
use crate::core::zoom::ZoomPlan;
use crate::layers::style::{Color, OverlayStyle};
use crate::layers::vector::GeometryCollector;
use crate::{MapError, Result};
use geo_types::{Coord, LineString, MultiLineString, MultiPolygon, Point};
use image::{Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

/// Draws geometries onto a canvas in plan coordinates.
///
/// Polygon rings take successive palette colors; the palette position only
/// advances for rings that are actually drawn.
pub struct OverlayPainter<'a> {
    pixmap: Pixmap,
    plan: &'a ZoomPlan,
    mercator: &'a GlobalMercator,
    style: &'a OverlayStyle,
    palette_index: usize,
}

impl<'a> OverlayPainter<'a> {
    pub fn new(
        base: &RgbaImage,
        plan: &'a ZoomPlan,
        mercator: &'a GlobalMercator,
        style: &'a OverlayStyle,
    ) -> Result<Self> {
        Ok(Self {
            pixmap: to_pixmap(base)?,
            plan,
            mercator,
            style,
            palette_index: 0,
        })
    }

    /// Lines, then polygons, then markers, each in registration order
    pub fn draw_all(&mut self, geometries: &GeometryCollector) -> Result<()> {
        for line in geometries.lines() {
            self.draw_line(line)?;
        }
        for polygon in geometries.polygons() {
            self.draw_polygon(polygon)?;
        }
        for marker in geometries.markers() {
            self.draw_marker(marker)?;
        }
        Ok(())
    }

    pub fn draw_line(&mut self, line: &MultiLineString<f64>) -> Result<()> {
        let style = &self.style.line;
        let paint = solid_paint(style.color.with_alpha(style.opacity));
        let stroke = round_stroke(style.width);

        for part in &line.0 {
            let points = self.transform(part)?;
            if points.len() < 2 {
                log::warn!("skipping line part with {} vertex", points.len());
                continue;
            }
            if let Some(path) = open_path(&points) {
                self.pixmap
                    .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        Ok(())
    }

    pub fn draw_polygon(&mut self, polygon: &MultiPolygon<f64>) -> Result<()> {
        let style = &self.style.polygon;
        let stroke = round_stroke(style.stroke_width);

        for part in &polygon.0 {
            let rings = std::iter::once(part.exterior()).chain(part.interiors());
            for ring in rings {
                let mut points = self.transform(ring)?;
                if points.len() > 1 && points.first() == points.last() {
                    points.pop();
                }
                if points.len() < 3 {
                    log::warn!("skipping degenerate polygon ring with {} vertices", points.len());
                    continue;
                }
                let Some(path) = closed_path(&points) else {
                    log::warn!("skipping polygon ring that produced no path");
                    continue;
                };

                let color = self.style.palette_color(self.palette_index);
                self.palette_index += 1;

                let fill = solid_paint(color.with_alpha(style.fill_opacity));
                let outline = solid_paint(color.with_alpha(style.stroke_opacity));
                self.pixmap
                    .fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
                self.pixmap
                    .stroke_path(&path, &outline, &stroke, Transform::identity(), None);
            }
        }
        Ok(())
    }

    pub fn draw_marker(&mut self, marker: &Point<f64>) -> Result<()> {
        let style = &self.style.marker;
        let (x, y) = self.plan.geo_to_canvas(self.mercator, marker.y(), marker.x())?;

        let Some(circle) = PathBuilder::from_circle(x as f32, y as f32, style.radius.max(0.5)) else {
            return Ok(());
        };
        let fill = solid_paint(style.fill_color.with_alpha(style.opacity));
        self.pixmap
            .fill_path(&circle, &fill, FillRule::Winding, Transform::identity(), None);

        if style.stroke_width > 0.0 {
            let outline = solid_paint(style.stroke_color.with_alpha(style.opacity));
            self.pixmap.stroke_path(
                &circle,
                &outline,
                &round_stroke(style.stroke_width),
                Transform::identity(),
                None,
            );
        }
        Ok(())
    }

    /// Rings drawn so far
    pub fn rings_drawn(&self) -> usize {
        self.palette_index
    }

    pub fn finish(self) -> RgbaImage {
        from_pixmap(&self.pixmap)
    }

    fn transform(&self, line: &LineString<f64>) -> Result<Vec<(f32, f32)>> {
        line.0
            .iter()
            .map(|Coord { x, y }| {
                self.plan
                    .geo_to_canvas(self.mercator, *y, *x)
                    .map(|(cx, cy)| (cx as f32, cy as f32))
            })
            .collect()
    }
}

/// Paints every geometry of `geometries` over `base`
pub fn paint_overlays(
    base: &RgbaImage,
    geometries: &GeometryCollector,
    plan: &ZoomPlan,
    mercator: &GlobalMercator,
    style: &OverlayStyle,
) -> Result<RgbaImage> {
    let mut painter = OverlayPainter::new(base, plan, mercator, style)?;
    painter.draw_all(geometries)?;
    log::debug!("painted {} polygon rings", painter.rings_drawn());
    Ok(painter.finish())
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn open_path(points: &[(f32, f32)]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.0, first.1);
    for (x, y) in rest {
        builder.line_to(*x, *y);
    }
    builder.finish()
}

fn closed_path(points: &[(f32, f32)]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.0, first.1);
    for (x, y) in rest {
        builder.line_to(*x, *y);
    }
    builder.close();
    builder.finish()
}

fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or_else(|| {
        MapError::Render(format!(
            "cannot allocate a {}x{} canvas",
            image.width(),
            image.height()
        ))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
