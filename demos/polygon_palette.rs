use geo_types::{polygon, Point};
use staticmap::{
    CacheConfig, Geometry, OutputFormat, SourceConfig, StaticMap, StaticMapConfig,
    TileProviderConfig,
};

/// Draws a few neighbouring polygons, one with a hole, plus markers at their
/// corners, and writes the result as a JPEG. Each ring gets the next palette color.
#[tokio::main]
async fn main() -> staticmap::Result<()> {
    env_logger::init();

    let config = StaticMapConfig::from_json_str(
        r#"{
            "canvas": { "max_width": 800, "max_height": 600, "padding": 40 },
            "output_format": "jpeg",
            "fetch": { "max_concurrent": 2, "max_retries": 2 }
        }"#,
    )?;
    assert_eq!(config.output_format, OutputFormat::Jpeg);

    let mut map = StaticMap::new(config);
    let google = TileProviderConfig::new(SourceConfig::google(), CacheConfig::on_disk("tile_cache"));
    map.set_tile_source(google.build(), (5..=15).rev());

    let blocks = [(-112.10, 33.40), (-112.05, 33.40), (-112.10, 33.45), (-112.05, 33.45)];
    for (lon, lat) in blocks {
        map.add_polygon(polygon![
            (x: lon, y: lat),
            (x: lon + 0.045, y: lat),
            (x: lon + 0.045, y: lat + 0.045),
            (x: lon, y: lat + 0.045),
        ]);
        map.add(Geometry::Marker(Point::new(lon, lat)));
    }
    map.add_polygon(polygon!(
        exterior: [
            (x: -112.00, y: 33.40),
            (x: -111.95, y: 33.40),
            (x: -111.95, y: 33.49),
            (x: -112.00, y: 33.49),
        ],
        interiors: [[
            (x: -111.99, y: 33.43),
            (x: -111.96, y: 33.43),
            (x: -111.96, y: 33.46),
            (x: -111.99, y: 33.46),
        ]],
    ));

    let rendered = map.render_to_file("polygons.jpg").await?;
    println!(
        "Wrote polygons.jpg ({}x{}) at zoom {}",
        rendered.width(),
        rendered.height(),
        rendered.plan.zoom
    );
    Ok(())
}
