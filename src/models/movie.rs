use serde::{Deserialize, Serialize};

/// A movie known to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    /// Display title, also the case-insensitive identity key
    pub title: String,
    /// Free-form genre label (e.g. "Sci-Fi")
    pub genre: String,
    /// Audience score as a percentage, 0–100
    pub rating: u8,
    /// Poster path relative to the image CDN, possibly empty
    pub poster_path: String,
}

impl CatalogItem {
    pub fn new(
        title: impl Into<String>,
        genre: impl Into<String>,
        rating: u8,
        poster_path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            genre: genre.into(),
            rating,
            poster_path: poster_path.into(),
        }
    }

    /// Label shown on recommendation cards, e.g. "87% Match"
    pub fn match_label(&self) -> String {
        format!("{}% Match", self.rating)
    }

    /// Label shown on search results, e.g. "87%"
    pub fn score_label(&self) -> String {
        format!("{}%", self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let movie = CatalogItem::new("The Matrix", "Sci-Fi", 87, "/matrix.jpg");
        assert_eq!(movie.match_label(), "87% Match");
        assert_eq!(movie.score_label(), "87%");
    }

    #[test]
    fn test_zero_rating_labels() {
        let movie = CatalogItem::new("Unrated", "", 0, "");
        assert_eq!(movie.match_label(), "0% Match");
        assert_eq!(movie.score_label(), "0%");
    }
}
