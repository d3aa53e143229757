//! In-memory movie catalog
//!
//! Loaded once at startup from a flat CSV file and never written afterwards,
//! so it can be shared between requests behind an `Arc` without locking.
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use rand::Rng;
use serde::Deserialize;

use crate::models::CatalogItem;

/// Genre filter value that disables genre filtering
pub const ALL_GENRES: &str = "All";

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog file malformed: {0}")]
    Csv(#[from] csv::Error),
}

/// One CSV row; every column is optional so absent data becomes empty strings
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}

impl From<CatalogRow> for CatalogItem {
    fn from(row: CatalogRow) -> Self {
        CatalogItem {
            title: row.title.unwrap_or_default(),
            genre: row.genre.unwrap_or_default(),
            rating: parse_rating(row.rating.as_deref().unwrap_or_default()),
            poster_path: row.poster_path.unwrap_or_default(),
        }
    }
}

/// Ratings are percentages; "73", "73.4" and "" all parse (the latter to 0)
fn parse_rating(raw: &str) -> u8 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    /// Case-folded title → index of its first row
    by_title: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from items in load order
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        let mut by_title = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            by_title.entry(title_key(&item.title)).or_insert(index);
        }
        Self { items, by_title }
    }

    /// Parses CSV from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let items = reader
            .deserialize::<CatalogRow>()
            .map(|row| row.map(CatalogItem::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_items(items))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Loads the catalog, substituting an empty one if the source is unusable
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %path.display(),
                    movies = catalog.len(),
                    "Loaded movie catalog"
                );
                catalog
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Catalog unavailable, serving an empty catalog"
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive exact match on the trimmed title
    pub fn find_by_title(&self, title: &str) -> Option<&CatalogItem> {
        self.by_title
            .get(&title_key(title))
            .map(|&index| &self.items[index])
    }

    /// Items whose title contains `keyword` and, unless `genre` is "All",
    /// whose genre contains `genre`. Both comparisons ignore case.
    pub fn filter<'a>(
        &'a self,
        keyword: &str,
        genre: &str,
    ) -> impl Iterator<Item = &'a CatalogItem> + 'a {
        let keyword = keyword.to_lowercase();
        let genre = (genre != ALL_GENRES).then(|| genre.to_lowercase());

        self.items.iter().filter(move |item| {
            (keyword.is_empty() || item.title.to_lowercase().contains(&keyword))
                && genre
                    .as_ref()
                    .map_or(true, |g| item.genre.to_lowercase().contains(g.as_str()))
        })
    }

    /// Picks up to `n` random items without replacement.
    ///
    /// Titles in `exclude` (case-folded) are never picked, and no title is
    /// picked twice even if the file repeats it.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        exclude: &HashSet<String>,
        rng: &mut R,
    ) -> Vec<&CatalogItem> {
        let mut seen = HashSet::new();
        let pool: Vec<&CatalogItem> = self
            .items
            .iter()
            .filter(|item| {
                let key = title_key(&item.title);
                !exclude.contains(&key) && seen.insert(key)
            })
            .collect();

        if n >= pool.len() {
            return pool;
        }

        rand::seq::index::sample(rng, pool.len(), n)
            .into_iter()
            .map(|index| pool[index])
            .collect()
    }

    /// Case-folded key used by `sample`'s exclusion set
    pub fn key_for(title: &str) -> String {
        title_key(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CSV: &str = "\
title,genre,rating,poster_path,overview,id
The Matrix,Sci-Fi,87,/matrix.jpg,Neo wakes up,603
Inception,Sci-Fi,84,/inception.jpg,Dreams,27205
Heat,Crime,79,/heat.jpg,,949
Toy Story,Animation,80,,,862
";

    fn catalog() -> Catalog {
        Catalog::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_from_reader_keeps_load_order() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 4);
        let titles: Vec<_> = catalog.filter("", ALL_GENRES).map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["The Matrix", "Inception", "Heat", "Toy Story"]);
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let catalog = Catalog::from_reader("title,genre\nAlien,\n".as_bytes()).unwrap();
        let alien = catalog.find_by_title("alien").unwrap();
        assert_eq!(alien.genre, "");
        assert_eq!(alien.poster_path, "");
        assert_eq!(alien.rating, 0);
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("73"), 73);
        assert_eq!(parse_rating(" 73.6 "), 74);
        assert_eq!(parse_rating("150"), 100);
        assert_eq!(parse_rating("-3"), 0);
        assert_eq!(parse_rating(""), 0);
        assert_eq!(parse_rating("n/a"), 0);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let catalog = Catalog::load("/definitely/not/here/movies.csv");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        std::fs::write(&path, CSV).unwrap();

        assert_eq!(Catalog::load(&path).len(), 4);
    }

    #[test]
    fn test_find_by_title_is_case_insensitive_and_trimmed() {
        let catalog = catalog();
        assert_eq!(catalog.find_by_title("  the MATRIX ").unwrap().rating, 87);
        assert!(catalog.find_by_title("The Matrix Reloaded").is_none());
        assert!(catalog.find_by_title("").is_none());
    }

    #[test]
    fn test_find_by_title_prefers_first_duplicate() {
        let catalog =
            Catalog::from_reader("title,rating\nDune,60\ndune,90\n".as_bytes()).unwrap();
        assert_eq!(catalog.find_by_title("DUNE").unwrap().rating, 60);
    }

    #[test]
    fn test_filter_keyword_and_genre() {
        let catalog = catalog();

        let sci_fi: Vec<_> = catalog.filter("", "sci-fi").map(|m| m.title.as_str()).collect();
        assert_eq!(sci_fi, vec!["The Matrix", "Inception"]);

        let keyword: Vec<_> = catalog.filter("IN", ALL_GENRES).map(|m| m.title.as_str()).collect();
        assert_eq!(keyword, vec!["Inception"]);

        assert_eq!(catalog.filter("heat", "Sci-Fi").count(), 0);
    }

    #[test]
    fn test_genre_filter_narrows() {
        let catalog = catalog();
        let all: Vec<_> = catalog.filter("e", ALL_GENRES).collect();
        for item in catalog.filter("e", "Crime") {
            assert!(all.contains(&item));
        }
    }

    #[test]
    fn test_sample_excludes_and_never_repeats() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        let exclude = HashSet::from([Catalog::key_for("Heat")]);

        for _ in 0..20 {
            let picked = catalog.sample(2, &exclude, &mut rng);
            assert_eq!(picked.len(), 2);
            assert!(picked.iter().all(|m| m.title != "Heat"));
            assert_ne!(picked[0].title, picked[1].title);
        }
    }

    #[test]
    fn test_sample_more_than_pool_returns_pool() {
        let catalog =
            Catalog::from_reader("title\nAlpha\nBeta\nalpha\n".as_bytes()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let picked = catalog.sample(8, &HashSet::new(), &mut rng);
        let titles: Vec<_> = picked.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_sample_empty_catalog() {
        let catalog = Catalog::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(catalog.sample(8, &HashSet::new(), &mut rng).is_empty());
    }
}
