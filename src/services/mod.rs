pub mod catalog;
pub mod inference;
pub mod recommendations;
pub mod search;

pub use catalog::Catalog;
pub use inference::InferenceAdapter;
pub use recommendations::Recommender;
