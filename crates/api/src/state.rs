use std::sync::Arc;

use questlog_core::image_cache::{ImageBackend, ImageCacheResolver};
use questlog_core::lifecycle::QuestLifecycle;
use questlog_core::loot::LootSource;
use questlog_core::quest::QuestPlanner;
use questlog_core::store::Stores;

use crate::artwork::ArtworkStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence capabilities.
    pub stores: Stores,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Quest completion state machine.
    pub lifecycle: Arc<QuestLifecycle>,
    /// Goal decomposition.
    pub planner: Arc<dyn QuestPlanner>,
    /// Image backend chain with cache short-circuit.
    pub images: ImageCacheResolver,
    /// On-disk artwork storage.
    pub artwork: Arc<ArtworkStore>,
}

impl AppState {
    /// Wire the lifecycle and resolver from their capabilities.
    pub fn new(
        stores: Stores,
        config: ServerConfig,
        loot: Arc<dyn LootSource>,
        planner: Arc<dyn QuestPlanner>,
        image_backends: Vec<Arc<dyn ImageBackend>>,
    ) -> Self {
        let lifecycle = QuestLifecycle::new(stores.quests.clone(), stores.characters.clone(), loot);
        let artwork = ArtworkStore::new(config.artwork_dir.clone());
        Self {
            stores,
            config: Arc::new(config),
            lifecycle: Arc::new(lifecycle),
            planner,
            images: ImageCacheResolver::new(image_backends),
            artwork: Arc::new(artwork),
        }
    }
}
