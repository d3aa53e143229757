//! Retrieval model abstraction
//!
//! The model is a frozen artifact produced elsewhere: an opaque user id goes
//! in, a ranked list of movie titles comes out. Backends differ only in where
//! the artifact lives (an exported index on disk, or a model server).
use std::sync::Arc;

use crate::config::{Config, ModelBackend};

pub mod index;
pub mod serving;

pub use index::IndexModel;
pub use serving::ServingModel;

/// Ranked titles as returned by the model, best first
pub type PredictionList = Vec<String>;

#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    #[error("Model disabled")]
    Disabled,

    #[error("Model artifact unavailable: {0}")]
    ArtifactUnavailable(String),

    #[error("Model artifact invalid: {0}")]
    InvalidArtifact(String),

    #[error("Model rejected the request: {0}")]
    CallingConvention(String),

    #[error("Model output malformed: {0}")]
    MalformedOutput(String),

    #[error("Model transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Trait for retrieval model backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RetrievalModel: Send + Sync {
    /// Ranked candidate titles for `user_id`
    async fn predict(&self, user_id: &str) -> Result<PredictionList, InferenceError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Wraps the configured retrieval model.
///
/// An adapter whose artifact could not be loaded at startup stays disabled for
/// the lifetime of the process and never attempts an invocation.
#[derive(Clone, Default)]
pub struct InferenceAdapter {
    model: Option<Arc<dyn RetrievalModel>>,
}

impl InferenceAdapter {
    pub fn new(model: Arc<dyn RetrievalModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn disabled() -> Self {
        Self { model: None }
    }

    /// Builds the backend named in `config`, falling back to a disabled adapter
    pub async fn load(config: &Config) -> Self {
        let loaded: Result<Arc<dyn RetrievalModel>, InferenceError> = match config.model_backend {
            ModelBackend::None => {
                tracing::info!("Model backend disabled by configuration");
                return Self::disabled();
            }
            ModelBackend::Index => IndexModel::load(&config.model_path)
                .await
                .map(|model| Arc::new(model) as Arc<dyn RetrievalModel>),
            ModelBackend::Serving => ServingModel::connect(
                &config.model_serving_url,
                &config.model_name,
                &config.model_input_key,
                config.model_timeout(),
            )
            .await
            .map(|model| Arc::new(model) as Arc<dyn RetrievalModel>),
        };

        match loaded {
            Ok(model) => {
                tracing::info!(backend = model.name(), "Retrieval model loaded");
                Self::new(model)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Retrieval model unavailable, running in fallback mode"
                );
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub async fn predict(&self, user_id: &str) -> Result<PredictionList, InferenceError> {
        match &self.model {
            Some(model) => model.predict(user_id).await,
            None => Err(InferenceError::Disabled),
        }
    }
}
