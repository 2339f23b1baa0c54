use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use ember_storefront_service::commands::orders::{self, ContactDetails};
use ember_storefront_service::establish_connection;

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::{require_user, resolve_session, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(place_order).get(list_orders))
        .route("/orders/{id}", get(get_order).delete(cancel_order))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed from the current cart", body = OrderResponse),
        (status = 400, description = "Missing contact fields or empty cart", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state, payload))]
pub async fn place_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let contact = ContactDetails {
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        address: payload.address,
        email: payload.email,
    };
    // Reject incomplete contact details before opening a connection
    let contact = orders::validate_contact(&contact)?;

    let conn = &mut establish_connection();
    let (order, lines) = orders::place(conn, &user_id, &contact)?;

    Ok(Json((order, lines).into()))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders of the authenticated user, newest first", body = Vec<OrderResponse>),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    let orders = orders::list_for_user(conn, &user_id)?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "Order details", body = OrderResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Order ID"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    let (order, lines) = orders::get(conn, &order_id)?;

    // Owners see their own orders; the back office sees all of them
    if order.user_id != user_id && !session.is_admin() {
        return Err(ApiError::NotFound("Order"));
    }

    Ok(Json((order, lines).into()))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    responses(
        (status = 204, description = "Order cancelled"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 409, description = "Order is no longer pending", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Order ID"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn cancel_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    let user_id = require_user(&session)?;

    let conn = &mut establish_connection();
    orders::delete_own_pending(conn, &user_id, &order_id)?;

    Ok(StatusCode::NO_CONTENT)
}
