use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::ResultMovie,
    services::providers::ProviderError,
};

use super::AppState;

/// Title used to check that a TMDB key works
const KEY_CHECK_QUERY: &str = "interstellar";

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CommonMoviesRequest {
    pub usernames: Vec<String>,
    /// Overrides the server's TMDB key for this request
    #[serde(default)]
    pub tmdb_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommonMoviesResponse {
    pub movies: Vec<ResultMovie>,
    pub total: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyCheckRequest {
    #[serde(default)]
    pub tmdb_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KeyCheckResponse {
    pub message: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Finds the movies shared by two or more of the given watchlists
pub async fn common_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CommonMoviesRequest>,
) -> AppResult<Json<CommonMoviesResponse>> {
    let key = state.api_key(request.tmdb_api_key.as_deref());

    tracing::info!(
        request_id = %request_id,
        users = request.usernames.len(),
        metadata_enabled = key.is_some(),
        "Processing common movies request"
    );

    let movies = state
        .pipeline
        .resolve(&request.usernames, key)
        .await
        .map_err(|e| {
            if e.is_user_attributable() {
                tracing::info!(request_id = %request_id, error = %e, "Common movies request rejected for a username");
            } else {
                tracing::warn!(request_id = %request_id, error = %e, "Common movies request failed");
            }
            e
        })?;

    tracing::info!(
        request_id = %request_id,
        movies = movies.len(),
        "Common movies request completed"
    );

    Ok(Json(CommonMoviesResponse {
        total: movies.len(),
        movies,
        generated_at: Utc::now(),
    }))
}

/// Runs one search to confirm a TMDB key is usable
pub async fn check_metadata_key(
    State(state): State<AppState>,
    Json(request): Json<KeyCheckRequest>,
) -> AppResult<Json<KeyCheckResponse>> {
    let key = state
        .api_key(request.tmdb_api_key.as_deref())
        .ok_or_else(|| AppError::InvalidInput("TMDB API key not configured".to_string()))?;

    let results = state
        .metadata_provider
        .search_movie(&key, KEY_CHECK_QUERY, None)
        .await
        .map_err(|e| match e {
            ProviderError::Status(401) => AppError::Unauthorized("Invalid TMDB API key".to_string()),
            other => AppError::ExternalApi(format!("TMDB API error: {}", other)),
        })?;

    Ok(Json(KeyCheckResponse {
        message: format!(
            "TMDB API key is working! Found {} results for 'Interstellar'",
            results.len()
        ),
    }))
}
