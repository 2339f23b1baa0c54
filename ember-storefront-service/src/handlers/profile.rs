use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use tracing::instrument;

use ember_storefront_service::commands::users;
use ember_storefront_service::establish_connection;
use ember_storefront_service::models::ProfileChanges;

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::{require_user, resolve_session, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(get_profile).put(update_profile).delete(delete_account),
    )
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    let user = users::get(conn, &user_id)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Bad request", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "profile"
)]
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let changes = ProfileChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        address: payload.address,
    };

    let conn = &mut establish_connection();
    let user = users::update_profile(conn, &user_id, &changes)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/profile",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    users::delete(conn, &user_id)?;

    Ok(StatusCode::NO_CONTENT)
}
