use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, ContentKind, FilterSet, Genre, TitleDetails},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct GenresQuery {
    pub kind: ContentKind,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub filters: FilterSet,
    /// Identifiers the caller has already presented to the user
    #[serde(default)]
    pub shown_ids: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    /// `null` means the filters matched nothing, which is not an error
    pub suggestion: Option<CatalogItem>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Lists the genres available for a content kind
pub async fn get_genres(
    State(state): State<AppState>,
    Query(params): Query<GenresQuery>,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.catalog.genres(params.kind).await?;
    Ok(Json(genres))
}

/// Returns one suggestion for the supplied filters and shown history
pub async fn suggest(
    State(state): State<AppState>,
    Json(request): Json<SuggestionRequest>,
) -> AppResult<Json<SuggestionResponse>> {
    request.filters.validate().map_err(AppError::InvalidInput)?;

    let suggestion = state
        .suggestions
        .random_suggestion(&request.filters, &request.shown_ids)
        .await?;

    Ok(Json(SuggestionResponse { suggestion }))
}

/// Discards the cached suggestion pool so the next request sweeps afresh
pub async fn clear_pool(State(state): State<AppState>) -> StatusCode {
    state.suggestions.clear().await;
    StatusCode::NO_CONTENT
}

/// Fetches full details for a single title
pub async fn title_details(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, u64)>,
) -> AppResult<Json<TitleDetails>> {
    let details = state.catalog.details(kind, id).await?;
    Ok(Json(details))
}
