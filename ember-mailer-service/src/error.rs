use axum::{http::StatusCode, response::Json};
use serde_json::json;

/// Failures surfaced by the relay routes.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The caller's payload failed validation; no provider call was made.
    #[error("{0}")]
    InvalidPayload(String),
    /// The provider answered the handoff with a non-success status.
    #[error("mail provider rejected the message ({status})")]
    Provider { status: StatusCode, body: String },
    /// The provider could not be reached at all.
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
}

impl axum::response::IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            RelayError::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, msg),
            // The raw provider body goes back to the caller unchanged.
            RelayError::Provider { body, .. } => (StatusCode::INTERNAL_SERVER_ERROR, body),
            RelayError::Upstream(err) => {
                tracing::error!(error = %err, "mail provider unreachable");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
