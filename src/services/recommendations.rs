use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use crate::{
    models::{CatalogItem, MovieCard},
    services::{
        catalog::Catalog,
        inference::{InferenceAdapter, InferenceError, PredictionList},
    },
};

/// Number of cards a recommendation response aims for
pub const TARGET_COUNT: usize = 8;

/// Below this many resolved model picks the list is padded from the catalog
pub const MIN_MODEL_PICKS: usize = 4;

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Model,
    Backfill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub item: &'a CatalogItem,
    pub source: CandidateSource,
}

/// Ordered, title-unique recommendations for one request
#[derive(Debug, Default)]
pub struct CandidateList<'a> {
    entries: Vec<Candidate<'a>>,
}

impl<'a> CandidateList<'a> {
    pub fn entries(&self) -> &[Candidate<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, source: CandidateSource) -> usize {
        self.entries.iter().filter(|c| c.source == source).count()
    }

    /// Cards labelled "<rating>% Match"
    pub fn to_cards(&self) -> Vec<MovieCard> {
        self.entries
            .iter()
            .map(|c| MovieCard::with_label(c.item, c.item.match_label()))
            .collect()
    }
}

/// Turns model predictions into a full recommendation row.
///
/// Model titles are resolved against the catalog; titles the catalog does not
/// know are dropped. When fewer than [`MIN_MODEL_PICKS`] survive, the row is
/// padded with random catalog items up to [`TARGET_COUNT`]. A row with
/// between `MIN_MODEL_PICKS` and `TARGET_COUNT - 1` model picks is returned
/// as-is.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    model: InferenceAdapter,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>, model: InferenceAdapter) -> Self {
        Self { catalog, model }
    }

    pub fn model_enabled(&self) -> bool {
        self.model.is_enabled()
    }

    /// Recommendations for `user_id`; never fails
    pub async fn recommend(&self, user_id: &str) -> CandidateList<'_> {
        let predictions = match self.model.predict(user_id).await {
            Ok(predictions) => predictions,
            Err(InferenceError::Disabled) => {
                tracing::debug!("Model disabled, recommending from catalog only");
                PredictionList::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Prediction failed");
                PredictionList::new()
            }
        };

        let candidates = self.assemble(&predictions, &mut rand::rng());

        tracing::info!(
            predicted = predictions.len(),
            model_picks = candidates.count(CandidateSource::Model),
            backfilled = candidates.count(CandidateSource::Backfill),
            "Recommendations assembled"
        );

        candidates
    }

    /// Resolves `predictions` and backfills using `rng`
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        predictions: &[String],
        rng: &mut R,
    ) -> CandidateList<'_> {
        let mut seen = HashSet::new();
        let mut entries: Vec<Candidate<'_>> = predictions
            .iter()
            .filter_map(|title| self.catalog.find_by_title(title))
            .filter(|item| seen.insert(Catalog::key_for(&item.title)))
            .map(|item| Candidate {
                item,
                source: CandidateSource::Model,
            })
            .collect();

        if entries.len() < MIN_MODEL_PICKS {
            let needed = TARGET_COUNT - entries.len();
            entries.extend(
                self.catalog
                    .sample(needed, &seen, rng)
                    .into_iter()
                    .map(|item| Candidate {
                        item,
                        source: CandidateSource::Backfill,
                    }),
            );
        }

        entries.truncate(TARGET_COUNT);
        CandidateList { entries }
    }
}
