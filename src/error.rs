use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Could not find profile for user: '{0}'. The profile may be private or the username is incorrect")]
    ProfileNotFound(String),

    #[error("Could not find a public watchlist for user: '{0}'. The profile may be private, empty, or the username is incorrect")]
    WatchlistFetch(String),

    #[error("No metadata found for: {0}")]
    MetadataNotFound(String),

    #[error("Metadata provider error: {0}")]
    MetadataTransport(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error is attributable to a specific user-supplied username
    pub fn is_user_attributable(&self) -> bool {
        matches!(self, AppError::ProfileNotFound(_) | AppError::WatchlistFetch(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::ProfileNotFound(_) | AppError::WatchlistFetch(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::MetadataNotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) | AppError::Unauthorized(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::ExternalApi(msg) | AppError::MetadataTransport(msg) => {
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
