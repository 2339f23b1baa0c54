//! Relay routes.
//!
//! Bodies are taken as raw JSON and decoded by hand so a missing or mistyped
//! field answers 400 like any other validation failure.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tracing::instrument;

use ember_mailer_api::{
    is_valid_email, RelayAccepted, SendConfirmationPayload, SendNewsletterPayload,
};

use crate::error::RelayError;
use crate::provider::MailProvider;
use crate::templates;

#[derive(Clone)]
pub struct AppState {
    pub provider: MailProvider,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/send-newsletter", post(send_newsletter))
        .route("/api/send-confirmation", post(send_confirmation))
}

#[instrument(skip(state, body))]
async fn send_newsletter(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RelayAccepted>, RelayError> {
    let payload: SendNewsletterPayload = serde_json::from_value(body)
        .map_err(|_| RelayError::InvalidPayload("Invalid email".to_string()))?;
    if !is_valid_email(&payload.email) {
        return Err(RelayError::InvalidPayload("Invalid email".to_string()));
    }

    let mail = templates::newsletter_welcome();
    state
        .provider
        .send(&payload.email, &mail.subject, &mail.html)
        .await?;
    Ok(Json(RelayAccepted { success: true }))
}

#[instrument(skip(state, body))]
async fn send_confirmation(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RelayAccepted>, RelayError> {
    let payload: SendConfirmationPayload = serde_json::from_value(body)
        .map_err(|_| RelayError::InvalidPayload("Missing or invalid fields".to_string()))?;
    if !is_valid_email(&payload.email) || payload.name.trim().is_empty() {
        return Err(RelayError::InvalidPayload(
            "Missing or invalid fields".to_string(),
        ));
    }

    let mail = templates::order_confirmation(&payload)?;
    state
        .provider
        .send(&payload.email, &mail.subject, &mail.html)
        .await?;
    Ok(Json(RelayAccepted { success: true }))
}
