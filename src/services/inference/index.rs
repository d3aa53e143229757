//! Brute-force retrieval index
//!
//! The trained two-tower model is exported as plain JSON: the user tower's
//! embedding table (with its vocabulary) and the precomputed embeddings of
//! every candidate title. Scoring is a dot product against all candidates,
//! the same thing a brute-force top-K layer does at serving time.
//!
//! File layout:
//! ```json
//! {
//!   "k": 10,
//!   "user_vocabulary": ["1", "2"],
//!   "user_embeddings": [[0.0, 0.0], [0.3, 0.1], [0.9, -0.2]],
//!   "candidates": ["Toy Story (1995)", "Heat (1995)"],
//!   "candidate_embeddings": [[0.5, 0.5], [0.1, 0.7]]
//! }
//! ```
//! Row 0 of `user_embeddings` is the out-of-vocabulary bucket; row `i + 1`
//! belongs to `user_vocabulary[i]`.
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::{InferenceError, PredictionList, RetrievalModel};

fn default_k() -> usize {
    10
}

#[derive(Debug, Deserialize)]
struct IndexArtifact {
    #[serde(default = "default_k")]
    k: usize,
    user_vocabulary: Vec<String>,
    user_embeddings: Vec<Vec<f32>>,
    candidates: Vec<String>,
    candidate_embeddings: Vec<Vec<f32>>,
}

#[derive(Debug)]
pub struct IndexModel {
    k: usize,
    /// User id → row in `user_embeddings`
    user_rows: HashMap<String, usize>,
    user_embeddings: Vec<Vec<f32>>,
    candidates: Vec<String>,
    candidate_embeddings: Vec<Vec<f32>>,
}

impl IndexModel {
    /// Reads and validates an exported index
    pub async fn load(path: &Path) -> Result<Self, InferenceError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            InferenceError::ArtifactUnavailable(format!("{}: {}", path.display(), e))
        })?;

        let model = Self::from_slice(&bytes)?;

        tracing::debug!(
            path = %path.display(),
            users = model.user_rows.len(),
            candidates = model.candidates.len(),
            k = model.k,
            "Retrieval index parsed"
        );

        Ok(model)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, InferenceError> {
        let artifact: IndexArtifact = serde_json::from_slice(bytes)
            .map_err(|e| InferenceError::InvalidArtifact(e.to_string()))?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: IndexArtifact) -> Result<Self, InferenceError> {
        if artifact.user_embeddings.len() != artifact.user_vocabulary.len() + 1 {
            return Err(InferenceError::InvalidArtifact(format!(
                "expected {} user embeddings (vocabulary plus OOV row), found {}",
                artifact.user_vocabulary.len() + 1,
                artifact.user_embeddings.len()
            )));
        }

        if artifact.candidates.len() != artifact.candidate_embeddings.len() {
            return Err(InferenceError::InvalidArtifact(format!(
                "{} candidates but {} candidate embeddings",
                artifact.candidates.len(),
                artifact.candidate_embeddings.len()
            )));
        }

        let dim = artifact.user_embeddings[0].len();
        let ragged = artifact
            .user_embeddings
            .iter()
            .chain(artifact.candidate_embeddings.iter())
            .any(|row| row.len() != dim);
        if dim == 0 || ragged {
            return Err(InferenceError::InvalidArtifact(
                "embeddings must share one non-zero dimension".to_string(),
            ));
        }

        let user_rows = artifact
            .user_vocabulary
            .into_iter()
            .enumerate()
            .map(|(i, user_id)| (user_id, i + 1))
            .collect();

        Ok(Self {
            k: artifact.k,
            user_rows,
            user_embeddings: artifact.user_embeddings,
            candidates: artifact.candidates,
            candidate_embeddings: artifact.candidate_embeddings,
        })
    }

    /// Top `k` candidates for the given user embedding row
    fn top_k(&self, row: usize) -> PredictionList {
        let query = &self.user_embeddings[row];

        let mut scored: Vec<(usize, f32)> = self
            .candidate_embeddings
            .iter()
            .enumerate()
            .map(|(i, candidate)| (i, dot(query, candidate)))
            .collect();

        // Stable sort keeps candidate order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(self.k)
            .map(|(i, _)| self.candidates[i].clone())
            .collect()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[async_trait::async_trait]
impl RetrievalModel for IndexModel {
    async fn predict(&self, user_id: &str) -> Result<PredictionList, InferenceError> {
        let row = self.user_rows.get(user_id).copied().unwrap_or(0);
        if row == 0 {
            tracing::debug!(user_id = %user_id, "Unknown user, scoring with OOV embedding");
        }
        Ok(self.top_k(row))
    }

    fn name(&self) -> &'static str {
        "index"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifact() -> serde_json::Value {
        json!({
            "k": 2,
            "user_vocabulary": ["42", "7"],
            "user_embeddings": [[0.0, 1.0], [1.0, 0.0], [-1.0, 0.0]],
            "candidates": ["Heat", "Toy Story", "Alien"],
            "candidate_embeddings": [[0.9, 0.1], [0.1, 0.8], [0.5, 0.5]]
        })
    }

    fn model(value: serde_json::Value) -> Result<IndexModel, InferenceError> {
        IndexModel::from_slice(&serde_json::to_vec(&value).unwrap())
    }

    #[tokio::test]
    async fn test_predict_known_user() {
        let model = model(artifact()).unwrap();
        assert_eq!(model.predict("42").await.unwrap(), vec!["Heat", "Alien"]);
    }

    #[tokio::test]
    async fn test_predict_unknown_user_uses_oov_row() {
        let model = model(artifact()).unwrap();
        assert_eq!(
            model.predict("nobody").await.unwrap(),
            vec!["Toy Story", "Alien"]
        );
    }

    #[tokio::test]
    async fn test_predict_orders_by_score() {
        let model = model(artifact()).unwrap();
        // [-1, 0] scores Toy Story (-0.1) above Alien (-0.5) above Heat (-0.9)
        assert_eq!(
            model.predict("7").await.unwrap(),
            vec!["Toy Story", "Alien"]
        );
    }

    #[tokio::test]
    async fn test_k_defaults_and_caps_at_candidates() {
        let mut value = artifact();
        value.as_object_mut().unwrap().remove("k");
        let model = model(value).unwrap();
        assert_eq!(model.predict("42").await.unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_missing_oov_row() {
        let mut value = artifact();
        value["user_embeddings"] = json!([[1.0, 0.0], [-1.0, 0.0]]);
        assert!(matches!(model(value), Err(InferenceError::InvalidArtifact(_))));
    }

    #[test]
    fn test_rejects_ragged_embeddings() {
        let mut value = artifact();
        value["candidate_embeddings"] = json!([[0.9, 0.1], [0.1], [0.5, 0.5]]);
        assert!(matches!(model(value), Err(InferenceError::InvalidArtifact(_))));
    }

    #[test]
    fn test_rejects_candidate_count_mismatch() {
        let mut value = artifact();
        value["candidates"] = json!(["Heat"]);
        assert!(matches!(model(value), Err(InferenceError::InvalidArtifact(_))));
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(
            IndexModel::from_slice(b"saved_model.pb"),
            Err(InferenceError::InvalidArtifact(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = IndexModel::load(Path::new("/definitely/not/here/index.json")).await;
        assert!(matches!(result, Err(InferenceError::ArtifactUnavailable(_))));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, serde_json::to_vec(&artifact()).unwrap()).unwrap();

        let model = IndexModel::load(&path).await.unwrap();
        assert_eq!(model.name(), "index");
        assert_eq!(model.predict("42").await.unwrap().len(), 2);
    }
}
