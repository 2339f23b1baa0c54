use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use ember_storefront_service::commands::reviews;
use ember_storefront_service::establish_connection;

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::{require_user, resolve_session, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_my_reviews).post(submit_review))
        .route(
            "/reviews/{review_id}",
            put(update_review).delete(delete_review),
        )
}

#[utoipa::path(
    post,
    path = "/reviews",
    request_body = SubmitReviewRequest,
    responses(
        (status = 200, description = "Review submitted", body = ReviewResponse),
        (status = 400, description = "Rating outside 1 to 5 or empty text", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "reviews"
)]
#[instrument(skip(state))]
pub async fn submit_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    // Reject bad ratings before opening a connection
    reviews::validate_rating(payload.rating)?;

    let conn = &mut establish_connection();
    let review = reviews::submit(
        conn,
        &user_id,
        &payload.dish_id,
        payload.rating,
        &payload.review_text,
    )?;
    let reviewer = ember_storefront_service::commands::users::get(conn, &user_id)?;

    Ok(Json((review, reviewer).into()))
}

#[utoipa::path(
    get,
    path = "/reviews",
    responses(
        (status = 200, description = "Own reviews, newest first", body = Vec<OwnReviewResponse>),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "reviews"
)]
#[instrument(skip(state))]
pub async fn list_my_reviews(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OwnReviewResponse>>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    let rows = reviews::list_for_user(conn, &user_id)?;

    Ok(Json(rows.into_iter().map(OwnReviewResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/reviews/{review_id}",
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Rating outside 1 to 5 or empty text", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Review not found", body = ApiErrorResponse),
    ),
    params(
        ("review_id" = Uuid, Path, description = "Review identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "reviews"
)]
#[instrument(skip(state))]
pub async fn update_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    // Reject bad ratings before opening a connection
    reviews::validate_rating(payload.rating)?;

    let conn = &mut establish_connection();
    let review = reviews::update_own(
        conn,
        &user_id,
        &review_id,
        payload.rating,
        &payload.review_text,
    )?;
    let reviewer = ember_storefront_service::commands::users::get(conn, &user_id)?;

    Ok(Json((review, reviewer).into()))
}

#[utoipa::path(
    delete,
    path = "/reviews/{review_id}",
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Review not found", body = ApiErrorResponse),
    ),
    params(
        ("review_id" = Uuid, Path, description = "Review identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "reviews"
)]
#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    reviews::delete_own(conn, &user_id, &review_id)?;

    Ok(StatusCode::NO_CONTENT)
}
