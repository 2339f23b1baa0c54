use axum::{
    extract::{Path, Query},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use ember_storefront_service::commands::catalog;
use ember_storefront_service::establish_connection;
use ember_storefront_service::models::DishCategory;

use crate::error::ApiError;
use crate::handlers::payloads::*;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ListDishesQuery {
    pub category: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dishes", get(list_dishes))
        .route("/dishes/{id}", get(get_dish))
        .route("/dishes/{id}/reviews", get(list_dish_reviews))
}

#[utoipa::path(
    get,
    path = "/dishes",
    responses(
        (status = 200, description = "Dishes, newest first", body = Vec<DishResponse>),
        (status = 400, description = "Unknown category", body = ApiErrorResponse),
    ),
    params(
        ("category" = Option<String>, Query, description = "Filter by category name"),
    ),
    tag = "catalog"
)]
#[instrument]
pub async fn list_dishes(
    Query(query): Query<ListDishesQuery>,
) -> Result<Json<Vec<DishResponse>>, ApiError> {
    let category = match &query.category {
        Some(raw) => Some(
            DishCategory::from_param(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown category: {raw}")))?,
        ),
        None => None,
    };

    let conn = &mut establish_connection();
    let dishes = catalog::list_dishes(conn, category)?;

    Ok(Json(dishes.into_iter().map(DishResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/dishes/{id}",
    responses(
        (status = 200, description = "Dish details", body = DishResponse),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Dish ID"),
    ),
    tag = "catalog"
)]
#[instrument]
pub async fn get_dish(Path(dish_id): Path<Uuid>) -> Result<Json<DishResponse>, ApiError> {
    let conn = &mut establish_connection();
    let dish = catalog::get_dish(conn, &dish_id)?;

    Ok(Json(dish.into()))
}

#[utoipa::path(
    get,
    path = "/dishes/{id}/reviews",
    responses(
        (status = 200, description = "Reviews of the dish, newest first", body = Vec<ReviewResponse>),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = Uuid, Path, description = "Dish ID"),
    ),
    tag = "catalog"
)]
#[instrument]
pub async fn list_dish_reviews(
    Path(dish_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let conn = &mut establish_connection();
    let reviews = catalog::dish_reviews(conn, &dish_id)?;

    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}
