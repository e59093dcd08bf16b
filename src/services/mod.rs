pub mod catalog;
pub mod suggestions;

pub use catalog::{CatalogProvider, SortKey, TmdbCatalog};
pub use suggestions::SuggestionService;
