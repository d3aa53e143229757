use serde::{Deserialize, Serialize};

mod movie;

pub use movie::CatalogItem;

/// Genre used when a search request does not name one
fn default_genre() -> String {
    crate::services::catalog::ALL_GENRES.to_string()
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    /// Opaque user identifier handed to the retrieval model
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    /// Title keyword; empty matches every title
    pub query: String,
    #[serde(default = "default_genre")]
    pub genre: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// A movie as rendered by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieCard {
    pub title: String,
    pub poster_path: String,
    /// Pre-formatted label, "87% Match" for recommendations and "87%" for search
    pub rating: String,
}

impl MovieCard {
    pub fn with_label(item: &CatalogItem, rating: String) -> Self {
        Self {
            title: item.title.clone(),
            poster_path: item.poster_path.clone(),
            rating,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub movies: Vec<MovieCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<MovieCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub movies_loaded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_defaults_genre() {
        let request: SearchRequest = serde_json::from_str(r#"{"query": "matrix"}"#).unwrap();
        assert_eq!(request.query, "matrix");
        assert_eq!(request.genre, "All");
    }

    #[test]
    fn test_search_request_requires_query() {
        let result: Result<SearchRequest, _> = serde_json::from_str(r#"{"genre": "Action"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_movie_card_serialization() {
        let item = CatalogItem::new("Heat", "Crime", 79, "/heat.jpg");
        let card = MovieCard::with_label(&item, item.match_label());

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Heat",
                "poster_path": "/heat.jpg",
                "rating": "79% Match"
            })
        );
    }
}
