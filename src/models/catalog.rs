use serde::{Deserialize, Serialize};

use super::filters::ContentKind;

/// A normalized catalog record returned to the client
///
/// The numeric `id` is the sole identity field; everything else is a snapshot
/// of whatever the catalog reported when the record was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub genre_ids: Vec<u32>,
    pub original_language: String,
    pub popularity: f64,
}

/// One page of discovery results, normalized
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub total_pages: u32,
    pub total_results: u32,
}

/// Genre entry as reported by the catalog's genre listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// ============================================================================
// Raw TMDB record shapes
// ============================================================================
//
// The movie and TV endpoints name their title and date fields differently.
// Both shapes are deserialized here and converted immediately; nothing past
// the adapter ever sees them.

/// Raw movie discovery record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieRecord {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    /// Alternate title field; some records carry the TV-style name instead
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub popularity: f64,
}

/// Raw TV discovery record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TvRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// Alternate title field, the movie-style key
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub popularity: f64,
}

/// The catalog reports missing dates as empty strings
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<MovieRecord> for CatalogItem {
    fn from(record: MovieRecord) -> Self {
        CatalogItem {
            id: record.id,
            // Prefer the movie-specific field, fall back to the alternate
            title: record.title.or(record.name).unwrap_or_default(),
            original_title: non_empty(record.original_title),
            overview: record.overview,
            poster_path: non_empty(record.poster_path),
            backdrop_path: non_empty(record.backdrop_path),
            vote_average: record.vote_average,
            vote_count: record.vote_count,
            release_date: non_empty(record.release_date),
            first_air_date: None,
            genre_ids: record.genre_ids,
            original_language: record.original_language,
            popularity: record.popularity,
        }
    }
}

impl From<TvRecord> for CatalogItem {
    fn from(record: TvRecord) -> Self {
        CatalogItem {
            id: record.id,
            title: record.name.or(record.title).unwrap_or_default(),
            original_title: non_empty(record.original_name),
            overview: record.overview,
            poster_path: non_empty(record.poster_path),
            backdrop_path: non_empty(record.backdrop_path),
            vote_average: record.vote_average,
            vote_count: record.vote_count,
            release_date: None,
            first_air_date: non_empty(record.first_air_date),
            genre_ids: record.genre_ids,
            original_language: record.original_language,
            popularity: record.popularity,
        }
    }
}

// ============================================================================
// Title details
// ============================================================================

/// Normalized per-title detail record (pass-through lookup, never pooled)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleDetails {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub genres: Vec<Genre>,
    pub original_language: String,
    pub popularity: f64,
    /// Runtime in minutes (movies)
    pub runtime: Option<u32>,
    /// Season/episode counts (TV kinds); drive miniseries classification
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
}

/// Raw detail response; covers both the movie and the TV shape
#[derive(Debug, Clone, Deserialize)]
pub struct DetailRecord {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
}

impl DetailRecord {
    /// Normalizes the raw detail shape for the requested kind
    pub fn into_details(self, kind: ContentKind) -> TitleDetails {
        let (title, original_title, release_date, first_air_date) = match kind {
            ContentKind::Movie => (
                self.title.or(self.name),
                self.original_title,
                non_empty(self.release_date),
                None,
            ),
            ContentKind::Tv | ContentKind::Miniseries => (
                self.name.or(self.title),
                self.original_name,
                None,
                non_empty(self.first_air_date),
            ),
        };

        TitleDetails {
            id: self.id,
            title: title.unwrap_or_default(),
            original_title: non_empty(original_title),
            overview: self.overview,
            poster_path: non_empty(self.poster_path),
            backdrop_path: non_empty(self.backdrop_path),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            release_date,
            first_air_date,
            genres: self.genres,
            original_language: self.original_language,
            popularity: self.popularity,
            runtime: self.runtime,
            number_of_seasons: self.number_of_seasons,
            number_of_episodes: self.number_of_episodes,
        }
    }
}
