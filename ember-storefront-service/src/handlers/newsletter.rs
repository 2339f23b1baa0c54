use axum::{response::Json, routing::post, Router};
use tracing::instrument;

use ember_storefront_service::commands::newsletter;
use ember_storefront_service::establish_connection;

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/newsletter", post(subscribe))
}

#[utoipa::path(
    post,
    path = "/newsletter",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed; a welcome mail is queued", body = SubscriptionResponse),
        (status = 400, description = "Malformed email", body = ApiErrorResponse),
        (status = 409, description = "Already subscribed", body = ApiErrorResponse),
    ),
    tag = "newsletter"
)]
#[instrument]
pub async fn subscribe(
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    // Reject malformed addresses before opening a connection
    let email = newsletter::normalize_and_validate(&payload.email)?;

    let conn = &mut establish_connection();
    let subscriber = newsletter::subscribe(conn, &email)?;

    Ok(Json(SubscriptionResponse {
        email: subscriber.email,
        created_at: subscriber.created_at,
    }))
}
