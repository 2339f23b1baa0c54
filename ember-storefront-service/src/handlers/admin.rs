use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use bigdecimal::BigDecimal;
use tracing::instrument;
use uuid::Uuid;

use ember_storefront_service::commands::catalog::{self, DishDraft};
use ember_storefront_service::commands::orders::{self, ContactDetails, OrderDraft, OrderLineDraft};
use ember_storefront_service::commands::users::{self, Registration};
use ember_storefront_service::commands::reviews;
use ember_storefront_service::establish_connection;
use ember_storefront_service::models::{AdminUserChanges, DishCategory, OrderStatus, UserRole};

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::{require_admin, resolve_session, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/dishes", post(create_dish))
        .route("/admin/dishes/{dish_id}", put(update_dish).delete(delete_dish))
        .route("/admin/orders", get(list_all_orders).post(create_order))
        .route("/admin/orders/{order_id}/status", put(update_order_status))
        .route("/admin/orders/{order_id}", delete(delete_order))
        .route("/admin/reviews", get(list_all_reviews).post(create_review))
        .route(
            "/admin/reviews/{review_id}",
            put(update_review).delete(delete_review),
        )
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/{user_id}", put(update_user).delete(delete_user))
}

fn dish_draft(payload: DishRequest) -> Result<DishDraft, ApiError> {
    let price = payload
        .price
        .parse::<BigDecimal>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid price: {}", payload.price)))?;
    let category = DishCategory::from_param(&payload.category)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown category: {}", payload.category)))?;
    Ok(DishDraft {
        title: payload.title,
        short_description: payload.short_description,
        description: payload.description,
        price,
        category,
        image_url: payload.image_url,
    })
}

#[utoipa::path(
    post,
    path = "/admin/dishes",
    request_body = DishRequest,
    responses(
        (status = 200, description = "Dish created", body = DishResponse),
        (status = 400, description = "Invalid dish fields", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn create_dish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DishRequest>,
) -> Result<Json<DishResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    let admin_id = require_admin(&session)?;
    let draft = dish_draft(payload)?;

    let conn = &mut establish_connection();
    let dish = catalog::create_dish(conn, &admin_id, draft)?;
    Ok(Json(dish.into()))
}

#[utoipa::path(
    put,
    path = "/admin/dishes/{dish_id}",
    request_body = DishRequest,
    responses(
        (status = 200, description = "Dish updated", body = DishResponse),
        (status = 400, description = "Invalid dish fields", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    params(
        ("dish_id" = Uuid, Path, description = "Dish identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn update_dish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(dish_id): Path<Uuid>,
    Json(payload): Json<DishRequest>,
) -> Result<Json<DishResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;
    let draft = dish_draft(payload)?;

    let conn = &mut establish_connection();
    let dish = catalog::update_dish(conn, &dish_id, draft)?;
    Ok(Json(dish.into()))
}

#[utoipa::path(
    delete,
    path = "/admin/dishes/{dish_id}",
    responses(
        (status = 204, description = "Dish deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    params(
        ("dish_id" = Uuid, Path, description = "Dish identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn delete_dish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(dish_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let conn = &mut establish_connection();
    catalog::delete_dish(conn, &dish_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    responses(
        (status = 200, description = "Every order, newest first", body = Vec<OrderResponse>),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn list_all_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let conn = &mut establish_connection();
    let orders = orders::list_all(conn)?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/orders",
    request_body = AdminCreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid order fields", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AdminCreateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let status = OrderStatus::from_param(&payload.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown order status: {}", payload.status)))?;
    let lines = payload
        .items
        .into_iter()
        .map(|item| {
            let price = item
                .price
                .parse::<BigDecimal>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid price: {}", item.price)))?;
            Ok(OrderLineDraft {
                dish_id: item.dish_id,
                title: item.title,
                price,
                quantity: item.quantity,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;
    let draft = OrderDraft {
        user_id: payload.user_id,
        contact: ContactDetails {
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            address: payload.address,
            email: payload.email,
        },
        status,
        lines,
    };

    let conn = &mut establish_connection();
    let order = orders::admin_insert(conn, draft)?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    put,
    path = "/admin/orders/{order_id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = OrderResponse),
        (status = 400, description = "Unknown order status", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("order_id" = Uuid, Path, description = "Order identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn update_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;
    let status = OrderStatus::from_param(&payload.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown order status: {}", payload.status)))?;

    let conn = &mut establish_connection();
    orders::set_status(conn, &order_id, status)?;
    let order = orders::get(conn, &order_id)?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    delete,
    path = "/admin/orders/{order_id}",
    responses(
        (status = 204, description = "Order deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("order_id" = Uuid, Path, description = "Order identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let conn = &mut establish_connection();
    orders::delete(conn, &order_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/reviews",
    responses(
        (status = 200, description = "Every review with its reviewer and dish", body = Vec<AdminReviewResponse>),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn list_all_reviews(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminReviewResponse>>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let conn = &mut establish_connection();
    let rows = reviews::list_all(conn)?;
    Ok(Json(
        rows.into_iter().map(AdminReviewResponse::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/admin/reviews",
    request_body = AdminCreateReviewRequest,
    responses(
        (status = 200, description = "Review created", body = AdminReviewResponse),
        (status = 400, description = "Rating outside 1 to 5 or empty text", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "User or dish not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn create_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AdminCreateReviewRequest>,
) -> Result<Json<AdminReviewResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;
    reviews::validate_rating(payload.rating)?;

    let conn = &mut establish_connection();
    let reviewer = users::get(conn, &payload.user_id)?;
    let review = reviews::submit(
        conn,
        &payload.user_id,
        &payload.dish_id,
        payload.rating,
        &payload.review_text,
    )?;
    let dish = catalog::get_dish(conn, &payload.dish_id)?;

    Ok(Json((review, reviewer, dish).into()))
}

#[utoipa::path(
    put,
    path = "/admin/reviews/{review_id}",
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = AdminReviewResponse),
        (status = 400, description = "Rating outside 1 to 5 or empty text", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "Review not found", body = ApiErrorResponse),
    ),
    params(
        ("review_id" = Uuid, Path, description = "Review identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn update_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<AdminReviewResponse>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;
    reviews::validate_rating(payload.rating)?;

    let conn = &mut establish_connection();
    let review = reviews::update(conn, &review_id, payload.rating, &payload.review_text)?;
    let reviewer = users::get(conn, &review.user_id)?;
    let dish = catalog::get_dish(conn, &review.dish_id)?;

    Ok(Json((review, reviewer, dish).into()))
}

#[utoipa::path(
    delete,
    path = "/admin/reviews/{review_id}",
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "Review not found", body = ApiErrorResponse),
    ),
    params(
        ("review_id" = Uuid, Path, description = "Review identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let conn = &mut establish_connection();
    reviews::delete(conn, &review_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Every account, newest first", body = Vec<UserProfile>),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let conn = &mut establish_connection();
    let users = users::list_all(conn)?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = AdminCreateUserRequest,
    responses(
        (status = 200, description = "Account created", body = UserProfile),
        (status = 400, description = "Invalid account fields", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 409, description = "Email already registered", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;
    let role = UserRole::from_param(&payload.role)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown role: {}", payload.role)))?;
    let registration = Registration {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        photo_url: payload.photo_url,
        password: payload.password,
    };
    let registration = users::validate_registration(&registration)?;

    let conn = &mut establish_connection();
    let user = users::admin_insert(conn, &registration, role)?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/admin/users/{user_id}",
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = UserProfile),
        (status = 400, description = "Invalid account fields", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    params(
        ("user_id" = Uuid, Path, description = "User identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;
    let role = UserRole::from_param(&payload.role)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown role: {}", payload.role)))?;
    let changes = AdminUserChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        address: payload.address,
        role,
    };

    let conn = &mut establish_connection();
    let user = users::admin_update(conn, &user_id, &changes)?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Admin access required", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    params(
        ("user_id" = Uuid, Path, description = "User identifier"),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = resolve_session(&headers, &state);
    require_admin(&session)?;

    let conn = &mut establish_connection();
    users::delete(conn, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
