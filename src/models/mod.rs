pub mod catalog;
pub mod filters;

pub use catalog::{CatalogItem, CatalogPage, DetailRecord, Genre, MovieRecord, TitleDetails, TvRecord};
pub use filters::{ContentKind, FilterSet};
