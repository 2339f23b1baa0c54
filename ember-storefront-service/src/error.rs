use axum::{http::StatusCode, response::Json};
use serde_json::json;

use ember_storefront_service::commands::CommandError;
use ember_storefront_service::media::MediaError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Invalid credentials")]
    AuthenticationFailed,
    #[error("Admin access required")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Validation(msg) => ApiError::BadRequest(msg),
            CommandError::NotFound(entity) => ApiError::NotFound(entity),
            CommandError::Conflict(msg) => ApiError::Conflict(msg),
            CommandError::Hash(_) | CommandError::Database(_) => {
                tracing::error!(error = %err, "command failed");
                ApiError::Internal
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AlreadyExists => ApiError::Conflict("File already exists".to_string()),
            MediaError::InvalidName => ApiError::BadRequest("Invalid file name".to_string()),
            MediaError::Io(_) => {
                tracing::error!(error = %err, "media store failed");
                ApiError::Internal
            }
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::AuthenticationFailed => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Admin access required".to_string()),
            ApiError::NotFound(entity) => (StatusCode::NOT_FOUND, format!("{entity} not found")),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
