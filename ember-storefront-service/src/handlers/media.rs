use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use ember_storefront_service::commands::users;
use ember_storefront_service::establish_connection;
use ember_storefront_service::media::{image_extension, MediaCategory};

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::{require_admin, require_user, resolve_session, AppState};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
    pub overwrite: Option<bool>,
}

pub fn router() -> Router<AppState> {
    // POST lives under /uploads; the stored files are served back under
    // /media, which is mounted as a static directory.
    Router::new().route("/uploads/{category}", post(upload_media))
}

#[utoipa::path(
    post,
    path = "/uploads/{category}",
    request_body = Vec<u8>,
    responses(
        (status = 200, description = "File stored", body = MediaUploadResponse),
        (status = 400, description = "Unknown category or unsupported image type", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Dish images require admin access", body = ApiErrorResponse),
        (status = 409, description = "File already exists", body = ApiErrorResponse),
    ),
    params(
        ("category" = String, Path, description = "Either \"avatars\" or \"dishes\""),
        ("filename" = String, Query, description = "Original file name, used for its extension"),
        ("overwrite" = Option<bool>, Query, description = "Replace an existing file"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "media"
)]
#[instrument(skip(state, body))]
pub async fn upload_media(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(category): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<MediaUploadResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let category = MediaCategory::from_param(&category)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown media category: {category}")))?;
    if category == MediaCategory::Dishes {
        require_admin(&session)?;
    }

    let extension = image_extension(&query.filename)
        .ok_or_else(|| ApiError::BadRequest("Unsupported image type".to_string()))?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty upload".to_string()));
    }

    // Avatars are keyed by their owner so a re-upload replaces the old one;
    // dish images get a fresh name every time.
    let file_name = match category {
        MediaCategory::Avatars => format!("{user_id}.{extension}"),
        MediaCategory::Dishes => format!("{}.{extension}", Uuid::new_v4()),
    };
    let overwrite = query
        .overwrite
        .unwrap_or(category == MediaCategory::Avatars);

    let url = state.media.store(category, &file_name, &body, overwrite)?;

    if category == MediaCategory::Avatars {
        let conn = &mut establish_connection();
        users::set_photo_url(conn, &user_id, &url)?;
    }

    Ok(Json(MediaUploadResponse { url }))
}
