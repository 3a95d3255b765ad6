use crate::core::geo::TileCoord;
use crate::core::projection::GlobalMercator;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait representing anything that can produce tile URLs.
///
/// `coord` is always a canonical (TMS row order) coordinate; each source
/// converts it to whatever its server expects.
pub trait TileSource: Send + Sync {
    /// Short stable name used to namespace cache entries
    fn kind(&self) -> &'static str;

    /// Coordinate under which the tile is cached (XYZ row order)
    fn cache_coord(&self, coord: TileCoord) -> TileCoord {
        GlobalMercator::google_tile(coord)
    }

    /// Called once per tile request, before the cache is consulted
    fn on_request(&self) {}

    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

pub const DEFAULT_GOOGLE_TEMPLATE: &str =
    "https://mts0.google.com/vt/lyrs=t@129,r@185056370&hl=en&src=app&x={x}&y={y}&z={z}&s=";

/// XYZ tiles addressed directly by zoom/x/y
#[derive(Debug, Clone)]
pub struct GoogleSource {
    url_template: String,
}

impl GoogleSource {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_GOOGLE_TEMPLATE)
    }

    /// Template with `{x}`, `{y}` and `{z}` placeholders
    pub fn with_template(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }
}

impl Default for GoogleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for GoogleSource {
    fn kind(&self) -> &'static str {
        "google"
    }

    fn url(&self, coord: TileCoord) -> String {
        let xyz = GlobalMercator::google_tile(coord);
        self.url_template
            .replace("{x}", &xyz.x.to_string())
            .replace("{y}", &xyz.y.to_string())
            .replace("{z}", &xyz.z.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BingLayer {
    #[default]
    Road,
    Aerial,
    Hybrid,
}

impl BingLayer {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Road => "r",
            Self::Aerial => "a",
            Self::Hybrid => "h",
        }
    }
}

pub const DEFAULT_BING_SERVERS: usize = 4;
pub const DEFAULT_BING_VERSION: u32 = 392;

/// Quadkey-addressed tiles, spread over numbered mirror hosts.
///
/// The mirror index rotates on every tile request, cache hits included,
/// independent of the tile. The rotation state belongs to this instance alone.
#[derive(Debug)]
pub struct BingSource {
    layer: BingLayer,
    servers: usize,
    version: u32,
    counter: AtomicUsize,
}

impl BingSource {
    pub fn new(layer: BingLayer) -> Self {
        Self::with_servers(layer, DEFAULT_BING_SERVERS, DEFAULT_BING_VERSION)
    }

    pub fn with_servers(layer: BingLayer, servers: usize, version: u32) -> Self {
        Self {
            layer,
            servers: servers.max(1),
            version,
            counter: AtomicUsize::new(0),
        }
    }

    fn current_server(&self) -> usize {
        self.counter.load(Ordering::Relaxed) % self.servers
    }
}

impl Default for BingSource {
    fn default() -> Self {
        Self::new(BingLayer::default())
    }
}

impl TileSource for BingSource {
    fn kind(&self) -> &'static str {
        "bing"
    }

    fn on_request(&self) {
        self.counter.fetch_add(1, Ordering::Relaxed);
    }

    fn url(&self, coord: TileCoord) -> String {
        let quad_key = GlobalMercator::quad_key(GlobalMercator::google_tile(coord));
        let layer = self.layer.code();
        format!(
            "http://{layer}{server}.ortho.tiles.virtualearth.net/tiles/{layer}{quad_key}.png?g={version}",
            server = self.current_server(),
            version = self.version,
        )
    }
}

/// Selects and parameterises a tile source from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Google {
        #[serde(default = "default_google_template")]
        url_template: String,
    },
    Bing {
        #[serde(default)]
        layer: BingLayer,
        #[serde(default = "default_bing_servers")]
        servers: usize,
        #[serde(default = "default_bing_version")]
        version: u32,
    },
}

fn default_google_template() -> String {
    DEFAULT_GOOGLE_TEMPLATE.to_string()
}

fn default_bing_servers() -> usize {
    DEFAULT_BING_SERVERS
}

fn default_bing_version() -> u32 {
    DEFAULT_BING_VERSION
}

impl SourceConfig {
    pub fn google() -> Self {
        Self::Google {
            url_template: default_google_template(),
        }
    }

    pub fn bing() -> Self {
        Self::Bing {
            layer: BingLayer::default(),
            servers: DEFAULT_BING_SERVERS,
            version: DEFAULT_BING_VERSION,
        }
    }

    pub fn build(&self) -> Box<dyn TileSource> {
        match self {
            Self::Google { url_template } => Box::new(GoogleSource::with_template(url_template.clone())),
            Self::Bing {
                layer,
                servers,
                version,
            } => Box::new(BingSource::with_servers(*layer, *servers, *version)),
        }
    }
}
