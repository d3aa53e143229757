use std::sync::Arc;

use crate::config::Config;
use crate::services::{Catalog, InferenceAdapter, Recommender};

/// Shared application state
///
/// Built once at startup and read-only afterwards, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(catalog: Catalog, model: InferenceAdapter) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            recommender: Recommender::new(catalog.clone(), model),
            catalog,
        }
    }

    /// Loads the catalog and retrieval model named in `config`.
    ///
    /// Neither failing is fatal: an unreadable catalog becomes an empty one and
    /// an unavailable model leaves recommendations in fallback mode.
    pub async fn from_config(config: &Config) -> Self {
        let catalog = Catalog::load(&config.catalog_path);
        let model = InferenceAdapter::load(config).await;
        Self::new(catalog, model)
    }
}
