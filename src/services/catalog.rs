/// TMDB catalog provider
///
/// Translates a `FilterSet` into `/discover` queries and normalizes the two
/// remote record shapes (movie vs. TV) into `CatalogItem`. Also serves the
/// genre listing, per-title detail lookups, and a credential probe.
///
/// The provider never retries: non-success responses surface as catalog
/// errors and retry/degradation policy belongs to the suggestion service.
use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::DetailRecord, CatalogItem, CatalogPage, ContentKind, FilterSet, Genre,
        MovieRecord, TitleDetails, TvRecord,
    },
};
use chrono::NaiveDate;
use rand::{seq::IndexedRandom, Rng};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Floor on the rating-count so sparsely voted titles never surface
const VOTE_COUNT_FLOOR: u32 = 100;
/// TMDB TV type classifier for miniseries
const MINISERIES_TYPE_ID: u8 = 2;
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Sort orders supported by the discovery endpoint
///
/// One key is drawn at random per pool-building sweep so that repeated sweeps
/// surface different titles on the early pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PopularityAsc,
    PopularityDesc,
    ReleaseDateAsc,
    ReleaseDateDesc,
    RatingAsc,
    RatingDesc,
    VoteCountAsc,
    VoteCountDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::PopularityAsc,
        SortKey::PopularityDesc,
        SortKey::ReleaseDateAsc,
        SortKey::ReleaseDateDesc,
        SortKey::RatingAsc,
        SortKey::RatingDesc,
        SortKey::VoteCountAsc,
        SortKey::VoteCountDesc,
    ];

    /// Draws one of the supported sort orders
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> SortKey {
        Self::ALL
            .choose(rng)
            .copied()
            .unwrap_or(SortKey::PopularityDesc)
    }

    /// Remote `sort_by` value; the date keys are named per content kind
    pub fn as_query_value(&self, kind: ContentKind) -> &'static str {
        match (self, kind) {
            (SortKey::PopularityAsc, _) => "popularity.asc",
            (SortKey::PopularityDesc, _) => "popularity.desc",
            (SortKey::ReleaseDateAsc, ContentKind::Movie) => "primary_release_date.asc",
            (SortKey::ReleaseDateAsc, _) => "first_air_date.asc",
            (SortKey::ReleaseDateDesc, ContentKind::Movie) => "primary_release_date.desc",
            (SortKey::ReleaseDateDesc, _) => "first_air_date.desc",
            (SortKey::RatingAsc, _) => "vote_average.asc",
            (SortKey::RatingDesc, _) => "vote_average.desc",
            (SortKey::VoteCountAsc, _) => "vote_count.asc",
            (SortKey::VoteCountDesc, _) => "vote_count.desc",
        }
    }
}

/// Trait for catalog data providers
///
/// The suggestion service talks to the catalog exclusively through this seam,
/// which keeps pool-building logic testable without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch one discovery page for the given filters and sort order
    async fn discover(
        &self,
        filters: &FilterSet,
        page: u32,
        sort: SortKey,
    ) -> AppResult<CatalogPage>;

    /// List the genres available for a content kind
    async fn genres(&self, kind: ContentKind) -> AppResult<Vec<Genre>>;

    /// Fetch full details for a single title (uncached pass-through)
    async fn details(&self, kind: ContentKind, id: u64) -> AppResult<TitleDetails>;

    /// Probe the remote API to confirm the configured credential is accepted
    async fn validate_credential(&self) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse<T> {
    #[serde(default)]
    results: Vec<T>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    locale: String,
}

impl TmdbCatalog {
    /// Creates a new TMDB catalog client
    ///
    /// A missing credential is a configuration error raised here, before any
    /// network call can happen.
    pub fn new(api_key: String, api_url: String, locale: String) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config(
                "TMDB API key is missing; set TMDB_API_KEY".to_string(),
            ));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            locale,
        })
    }

    /// Builds the discovery query parameters for one page request
    fn discover_params(filters: &FilterSet, page: u32, sort: SortKey) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), page.to_string()),
            (
                "sort_by".to_string(),
                sort.as_query_value(filters.kind).to_string(),
            ),
            ("vote_average.gte".to_string(), filters.min_rating.to_string()),
            ("vote_count.gte".to_string(), VOTE_COUNT_FLOOR.to_string()),
        ];

        if !filters.genres.is_empty() {
            let genres = filters
                .genres
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("with_genres".to_string(), genres));
        }

        let date_field = filters.kind.date_field();
        if let Some(from) = filters.year_from.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)) {
            params.push((format!("{}.gte", date_field), from.to_string()));
        }
        if let Some(to) = filters.year_to.and_then(|y| NaiveDate::from_ymd_opt(y, 12, 31)) {
            params.push((format!("{}.lte", date_field), to.to_string()));
        }

        if let Some(language) = filters.language.as_deref() {
            params.push(("with_original_language".to_string(), language.to_string()));
        }

        if filters.kind == ContentKind::Miniseries {
            params.push(("with_type".to_string(), MINISERIES_TYPE_ID.to_string()));
        }

        params
    }

    /// Issues one GET request and deserializes the JSON response
    ///
    /// Every request carries the credential and the configured locale.
    async fn get_json<T>(&self, path: &str, params: &[(String, String)]) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.locale.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Config(
                "catalog rejected the configured API key".to_string(),
            ));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "catalog resource not found: {}",
                path
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Catalog {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbCatalog {
    async fn discover(
        &self,
        filters: &FilterSet,
        page: u32,
        sort: SortKey,
    ) -> AppResult<CatalogPage> {
        let path = format!("/discover/{}", filters.kind.endpoint_path());
        let params = Self::discover_params(filters, page, sort);

        let (items, total_pages, total_results) = match filters.kind {
            ContentKind::Movie => {
                let response: DiscoverResponse<MovieRecord> =
                    self.get_json(&path, &params).await?;
                (
                    response.results.into_iter().map(CatalogItem::from).collect(),
                    response.total_pages,
                    response.total_results,
                )
            }
            ContentKind::Tv | ContentKind::Miniseries => {
                let response: DiscoverResponse<TvRecord> = self.get_json(&path, &params).await?;
                (
                    response.results.into_iter().map(CatalogItem::from).collect(),
                    response.total_pages,
                    response.total_results,
                )
            }
        };

        let page_result = CatalogPage {
            items,
            total_pages,
            total_results,
        };

        tracing::debug!(
            kind = ?filters.kind,
            page = page,
            items = page_result.items.len(),
            total_pages = page_result.total_pages,
            "Discovery page fetched"
        );

        Ok(page_result)
    }

    async fn genres(&self, kind: ContentKind) -> AppResult<Vec<Genre>> {
        let path = format!("/genre/{}/list", kind.endpoint_path());
        let response: GenreListResponse = self.get_json(&path, &[]).await?;

        tracing::debug!(kind = ?kind, genres = response.genres.len(), "Genre list fetched");

        Ok(response.genres)
    }

    async fn details(&self, kind: ContentKind, id: u64) -> AppResult<TitleDetails> {
        let path = format!("/{}/{}", kind.endpoint_path(), id);
        let record: DetailRecord = self.get_json(&path, &[]).await?;
        Ok(record.into_details(kind))
    }

    async fn validate_credential(&self) -> AppResult<()> {
        let _: serde_json::Value = self.get_json("/configuration", &[]).await?;
        Ok(())
    }
}
