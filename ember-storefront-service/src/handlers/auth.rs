use axum::{extract::State, response::Json, routing::post, Form, Router};
use tracing::instrument;

use ember_storefront_service::commands::users::{self, Registration};
use ember_storefront_service::establish_connection;

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/auth/token", post(issue_token))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserProfile),
        (status = 400, description = "Bad request", body = ApiErrorResponse),
        (status = 409, description = "Email already registered", body = ApiErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(payload))]
pub async fn register_user(
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let registration = Registration {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        photo_url: payload.photo_url,
        password: payload.password,
    };
    // Reject malformed input before opening a connection
    let registration = users::validate_registration(&registration)?;

    let conn = &mut establish_connection();
    let user = users::register(conn, &registration)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Token issued successfully", body = IssueTokenResponse),
        (status = 401, description = "Invalid credentials", body = ApiErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    Form(payload): Form<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    // Validate grant_type
    if payload.grant_type != "password" {
        return Err(ApiError::AuthenticationFailed);
    }

    let conn = &mut establish_connection();
    let user = users::verify_credentials(conn, &payload.username, &payload.password)?
        .ok_or(ApiError::AuthenticationFailed)?;

    let issued = state.keys.issue(&user.id).map_err(|_| ApiError::Internal)?;

    Ok(Json(IssueTokenResponse {
        token_type: "bearer".to_string(),
        access_token: issued.access_token,
        expires_in: issued.expires_in,
    }))
}
