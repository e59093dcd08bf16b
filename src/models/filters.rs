use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Kind of content a suggestion request targets
///
/// `Miniseries` is not a separate remote category: the catalog serves it from
/// the TV endpoints with an extra type-classifier filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Movie,
    Tv,
    Miniseries,
}

impl ContentKind {
    /// Remote discovery/detail endpoint segment for this kind
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv | ContentKind::Miniseries => "tv",
        }
    }

    /// Date field the remote API filters this kind by
    pub fn date_field(&self) -> &'static str {
        match self {
            ContentKind::Movie => "primary_release_date",
            ContentKind::Tv | ContentKind::Miniseries => "first_air_date",
        }
    }
}

/// User-selected filters scoping one suggestion query
///
/// Field-wise equality is what keys the suggestion pool cache: any change to
/// any field invalidates the pool built for the previous value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterSet {
    pub kind: ContentKind,
    /// Genre identifiers; a set, so the order callers send them in is irrelevant
    #[serde(default)]
    pub genres: BTreeSet<u32>,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default)]
    pub year_to: Option<i32>,
    /// Original-language code; `None` means "any language"
    #[serde(default, deserialize_with = "deserialize_language")]
    pub language: Option<String>,
    /// Minimum rating average, 0-10
    #[serde(default = "default_min_rating")]
    pub min_rating: f64,
}

fn default_min_rating() -> f64 {
    7.0
}

/// Callers express "any language" as an absent field, an empty string, or the
/// literal "any"; all three must compare equal.
fn deserialize_language<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|lang| !lang.is_empty() && lang != "any"))
}

impl FilterSet {
    /// Validates field ranges before any remote call is issued
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=10.0).contains(&self.min_rating) {
            return Err(format!(
                "minimum rating must be between 0 and 10, got {}",
                self.min_rating
            ));
        }
        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(format!("year range is inverted: {} > {}", from, to));
            }
        }
        Ok(())
    }
}
