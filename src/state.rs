//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::application::services::{FileService, ImageService, ImageSettings, ZoneService};
use crate::deps::Deps;
use crate::infrastructure::kv::KvStore;
use crate::infrastructure::optimizer::ImageOptimizer;

/// State cloned into every handler.
///
/// Services are behind `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub zone_service: Arc<ZoneService>,
    pub file_service: Arc<FileService>,
    pub image_service: Arc<ImageService>,
    /// Kept for health checks.
    pub kv: Arc<dyn KvStore>,
    pub optimizer: Arc<dyn ImageOptimizer>,
}

impl AppState {
    /// Builds every service from one capability bundle.
    pub fn from_deps(deps: Deps, images: ImageSettings) -> Self {
        let zone_service = Arc::new(ZoneService::new(
            deps.zones.clone(),
            deps.files.clone(),
            deps.clock.clone(),
        ));

        let file_service = Arc::new(FileService::new(
            deps.files.clone(),
            deps.zones.clone(),
            deps.kv.clone(),
            deps.optimizer.clone(),
            deps.clock.clone(),
        ));

        let image_service = Arc::new(ImageService::new(
            deps.files,
            deps.kv.clone(),
            deps.optimizer.clone(),
            images,
        ));

        Self {
            zone_service,
            file_service,
            image_service,
            kv: deps.kv,
            optimizer: deps.optimizer,
        }
    }
}
