use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use ember_storefront_service::commands::cart;
use ember_storefront_service::establish_connection;

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::{require_user, resolve_session, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).post(add_cart_item))
        .route(
            "/cart/{dish_id}",
            axum::routing::put(update_cart_item).delete(remove_cart_item),
        )
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart of the authenticated user", body = CartResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    let rows = cart::list(conn, &user_id)?;

    Ok(Json(CartResponse::from_rows(rows)))
}

#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Cart with the dish at quantity 1", body = CartResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn add_cart_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    cart::add(conn, &user_id, &payload.dish_id)?;
    let rows = cart::list(conn, &user_id)?;

    Ok(Json(CartResponse::from_rows(rows)))
}

#[utoipa::path(
    put,
    path = "/cart/{dish_id}",
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Cart with the updated quantity", body = CartResponse),
        (status = 400, description = "Quantity below 1", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Cart line not found", body = ApiErrorResponse),
    ),
    params(
        ("dish_id" = Uuid, Path, description = "Dish whose cart line to update"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn update_cart_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(dish_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    // Reject bad quantities before opening a connection
    cart::validate_quantity(payload.quantity)?;

    let conn = &mut establish_connection();
    cart::set_quantity(conn, &user_id, &dish_id, payload.quantity)?;
    let rows = cart::list(conn, &user_id)?;

    Ok(Json(CartResponse::from_rows(rows)))
}

#[utoipa::path(
    delete,
    path = "/cart/{dish_id}",
    responses(
        (status = 204, description = "Cart line removed"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Cart line not found", body = ApiErrorResponse),
    ),
    params(
        ("dish_id" = Uuid, Path, description = "Dish whose cart line to remove"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "cart"
)]
#[instrument(skip(state))]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(dish_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    cart::remove(conn, &user_id, &dish_id)?;

    Ok(StatusCode::NO_CONTENT)
}
