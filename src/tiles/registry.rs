use super::provider::TileProvider;
use crate::core::config::CandidateOrder;
use crate::core::constants::MAX_ZOOM;
use crate::prelude::{Arc, HashMap};
use crate::{MapError, Result};

/// Maps each zoom level to the provider serving it.
///
/// Zooms are registered explicitly; a provider may serve many zooms and
/// coverage may be sparse. Registering a zoom again replaces its provider but
/// keeps its original position in the candidate order. Zooms above
/// [`MAX_ZOOM`] are skipped.
#[derive(Clone, Default)]
pub struct ZoomTileSourceRegistry {
    providers: HashMap<u8, Arc<dyn TileProvider>>,
    order: Vec<u8>,
}

impl ZoomTileSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn TileProvider>, zooms: impl IntoIterator<Item = u8>) {
        for zoom in zooms {
            if zoom > MAX_ZOOM {
                log::warn!(
                    "ignoring zoom {} for {} tiles, highest supported zoom is {}",
                    zoom,
                    provider.kind(),
                    MAX_ZOOM
                );
                continue;
            }
            if self.providers.insert(zoom, Arc::clone(&provider)).is_none() {
                self.order.push(zoom);
            }
        }
    }

    pub fn provider_for(&self, zoom: u8) -> Result<&Arc<dyn TileProvider>> {
        self.providers
            .get(&zoom)
            .ok_or(MapError::UnregisteredZoom(zoom))
    }

    pub fn contains(&self, zoom: u8) -> bool {
        self.providers.contains_key(&zoom)
    }

    /// Zoom levels in the order zoom selection should try them
    pub fn candidates(&self, order: CandidateOrder) -> Vec<u8> {
        let mut zooms = self.order.clone();
        if order == CandidateOrder::Descending {
            zooms.sort_unstable_by(|a, b| b.cmp(a));
        }
        zooms
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for ZoomTileSourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<(u8, &'static str)> = self
            .order
            .iter()
            .filter_map(|z| self.providers.get(z).map(|p| (*z, p.kind())))
            .collect();
        f.debug_struct("ZoomTileSourceRegistry")
            .field("zooms", &entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::TileCoord;
    use async_trait::async_trait;
    use image::RgbaImage;

    struct Named(&'static str);

    #[async_trait]
    impl TileProvider for Named {
        fn kind(&self) -> &'static str {
            self.0
        }

        async fn get_tile(&self, _coord: TileCoord) -> Result<RgbaImage> {
            Ok(RgbaImage::new(1, 1))
        }
    }

    #[test]
    fn test_candidates_follow_registration_order() {
        let mut registry = ZoomTileSourceRegistry::new();
        registry.register(Arc::new(Named("google")), [15, 14, 13]);
        registry.register(Arc::new(Named("bing")), [17, 16]);

        assert_eq!(registry.candidates(CandidateOrder::AsRegistered), vec![15, 14, 13, 17, 16]);
        assert_eq!(registry.candidates(CandidateOrder::Descending), vec![17, 16, 15, 14, 13]);
    }

    #[test]
    fn test_reregistering_replaces_provider() {
        let mut registry = ZoomTileSourceRegistry::new();
        registry.register(Arc::new(Named("google")), [12, 11]);
        registry.register(Arc::new(Named("bing")), [12]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.provider_for(12).unwrap().kind(), "bing");
        assert_eq!(registry.provider_for(11).unwrap().kind(), "google");
        assert_eq!(registry.candidates(CandidateOrder::AsRegistered), vec![12, 11]);
    }

    #[test]
    fn test_zooms_above_max_are_skipped() {
        let mut registry = ZoomTileSourceRegistry::new();
        registry.register(Arc::new(Named("google")), [64, 30, 31, 12]);

        assert_eq!(registry.candidates(CandidateOrder::AsRegistered), vec![30, 12]);
        assert!(!registry.contains(64));
        assert!(matches!(
            registry.provider_for(31),
            Err(MapError::UnregisteredZoom(31))
        ));
    }

    #[test]
    fn test_unregistered_zoom() {
        let registry = ZoomTileSourceRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.provider_for(9),
            Err(MapError::UnregisteredZoom(9))
        ));
    }
}
