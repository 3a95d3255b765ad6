use geo_types::line_string;
use staticmap::{
    CacheConfig, CandidateOrder, SourceConfig, StaticMap, StaticMapConfig, TileProviderConfig,
};

/// Renders a short line near Phoenix, AZ to `phoenix.png`.
///
/// Zooms 15..8 come from Google-style tiles and 17..16 from Bing, both cached
/// on disk under `tile_cache/`. Run with `RUST_LOG=debug` to watch cache hits.
#[tokio::main]
async fn main() -> staticmap::Result<()> {
    env_logger::init();

    let config = StaticMapConfig {
        candidate_order: CandidateOrder::Descending,
        ..StaticMapConfig::default()
    };
    let mut map = StaticMap::new(config);

    let google = TileProviderConfig::new(SourceConfig::google(), CacheConfig::on_disk("tile_cache"));
    let bing = TileProviderConfig::new(SourceConfig::bing(), CacheConfig::on_disk("tile_cache"));
    map.set_tile_source(google.build(), (8..=15).rev());
    map.set_tile_source(bing.build(), [17, 16]);

    map.add_line(line_string![(x: -111.9, y: 33.38), (x: -112.0, y: 33.43)]);

    let plan = map.zoom_plan()?;
    println!(
        "Rendering {}x{} at zoom {}{}",
        plan.width,
        plan.height,
        plan.zoom,
        if plan.overflow { " (exceeds canvas limits)" } else { "" }
    );

    let rendered = map.render_to_file("phoenix.png").await?;
    println!("Wrote phoenix.png ({}x{})", rendered.width(), rendered.height());
    Ok(())
}
