use crate::{models::MovieCard, services::catalog::Catalog};

/// Maximum number of search results returned
pub const MAX_RESULTS: usize = 12;

/// Keyword + genre search over the catalog
///
/// Results keep catalog order, are capped at [`MAX_RESULTS`] and are labelled
/// "<rating>%". An empty result is a valid answer; nothing is backfilled.
pub fn search_titles(catalog: &Catalog, keyword: &str, genre: &str) -> Vec<MovieCard> {
    catalog
        .filter(keyword, genre)
        .take(MAX_RESULTS)
        .map(|item| MovieCard::with_label(item, item.score_label()))
        .collect()
}
