use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use ember_storefront_service::commands::cart::cart_total;
use ember_storefront_service::models::{CartLine, Dish, Order, OrderLine, Review, User};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Given name of the new customer
    pub first_name: String,
    /// Family name of the new customer
    pub last_name: String,
    /// Email address, also used as the login name
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Delivery address
    pub address: String,
    /// Avatar URL from a prior upload, if any
    pub photo_url: Option<String>,
    /// Password (at least 6 characters)
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueTokenRequest {
    /// Grant type (must be "password")
    pub grant_type: String,
    /// Email address of the account
    pub username: String,
    /// Password for authentication
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTokenResponse {
    /// Token type (always "bearer")
    pub token_type: String,
    /// Access token
    pub access_token: String,
    /// Token expiration time in seconds
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    /// Unique identifier for the user
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Public URL of the avatar image, if one was uploaded
    pub photo_url: Option<String>,
    /// Either "customer" or "admin"
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            photo_url: user.photo_url,
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminUpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    /// Either "customer" or "admin"
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminCreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: Option<String>,
    /// Password (at least 6 characters)
    pub password: String,
    /// Either "customer" or "admin"
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DishRequest {
    /// Display name of the dish
    pub title: String,
    /// One-line teaser shown on menu cards
    pub short_description: String,
    /// Full description shown on the detail page
    pub description: String,
    /// Price as a decimal string, e.g. "12.50"
    pub price: String,
    /// One of "Appetizer", "Main Course", "Dessert", "Drinks"
    pub category: String,
    /// Public URL of the dish image
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DishResponse {
    /// Unique identifier for the dish
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub description: String,
    /// Price as a decimal string
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Dish> for DishResponse {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            title: dish.title,
            short_description: dish.short_description,
            description: dish.description,
            price: dish.price.to_string(),
            category: dish.category.as_str().to_string(),
            image_url: dish.image_url,
            created_at: dish.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    /// Dish to add to the cart
    pub dish_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    /// New quantity, at least 1
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub dish_id: Uuid,
    pub title: String,
    /// Current unit price as a decimal string
    pub price: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    /// quantity × current price
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    /// Grand total over current dish prices
    pub total: String,
}

impl CartResponse {
    pub fn from_rows(rows: Vec<(CartLine, Dish)>) -> Self {
        let total = cart_total(&rows).to_string();
        let items = rows
            .into_iter()
            .map(|(line, dish)| CartItemResponse {
                dish_id: dish.id,
                title: dish.title,
                price: dish.price.to_string(),
                image_url: dish.image_url,
                quantity: line.quantity,
                line_total: (dish.price * BigDecimal::from(line.quantity)).to_string(),
            })
            .collect();
        Self { items, total }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    /// Originating dish, absent when that dish was deleted later
    pub dish_id: Option<Uuid>,
    /// Dish title at placement time
    pub title: String,
    /// Unit price at placement time, as a decimal string
    pub price: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    /// Unique identifier for the order
    pub id: Uuid,
    /// One of "pending", "processing", "shipped", "delivered", "cancelled"
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    /// Total as a decimal string, fixed at placement time
    pub total_amount: String,
    pub order_date: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<(Order, Vec<OrderLine>)> for OrderResponse {
    fn from((order, lines): (Order, Vec<OrderLine>)) -> Self {
        Self {
            id: order.id,
            status: order.status.as_str().to_string(),
            first_name: order.first_name,
            last_name: order.last_name,
            phone: order.phone,
            address: order.address,
            email: order.email,
            total_amount: order.total_amount.to_string(),
            order_date: order.order_date,
            items: lines
                .into_iter()
                .map(|line| OrderItemResponse {
                    dish_id: line.dish_id,
                    title: line.title,
                    price: line.price.to_string(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// One of "pending", "processing", "shipped", "delivered", "cancelled"
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminOrderItemRequest {
    /// Referenced dish, if the line should keep one
    pub dish_id: Option<Uuid>,
    pub title: String,
    /// Unit price as a decimal string
    pub price: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminCreateOrderRequest {
    /// Owning user
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    /// One of "pending", "processing", "shipped", "delivered", "cancelled"
    pub status: String,
    pub items: Vec<AdminOrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    /// Dish being reviewed
    pub dish_id: Uuid,
    /// Star rating from 1 to 5
    pub rating: i32,
    pub review_text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    /// Star rating from 1 to 5
    pub rating: i32,
    pub review_text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminCreateReviewRequest {
    /// Reviewing user
    pub user_id: Uuid,
    /// Reviewed dish
    pub dish_id: Uuid,
    /// Star rating from 1 to 5
    pub rating: i32,
    pub review_text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub rating: i32,
    pub review_text: String,
    /// Display name of the reviewer
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<(Review, User)> for ReviewResponse {
    fn from((review, user): (Review, User)) -> Self {
        Self {
            id: review.id,
            dish_id: review.dish_id,
            rating: review.rating,
            review_text: review.review_text,
            reviewer_name: format!("{} {}", user.first_name, user.last_name),
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OwnReviewResponse {
    pub id: Uuid,
    pub dish_id: Uuid,
    /// Current title of the reviewed dish
    pub dish_title: String,
    pub dish_image_url: Option<String>,
    pub rating: i32,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<(Review, Dish)> for OwnReviewResponse {
    fn from((review, dish): (Review, Dish)) -> Self {
        Self {
            id: review.id,
            dish_id: review.dish_id,
            dish_title: dish.title,
            dish_image_url: dish.image_url,
            rating: review.rating,
            review_text: review.review_text,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminReviewResponse {
    pub id: Uuid,
    pub dish_id: Uuid,
    /// Current title of the reviewed dish
    pub dish_title: String,
    pub rating: i32,
    pub review_text: String,
    pub reviewer_name: String,
    /// Email of the reviewer, for moderation follow-ups
    pub reviewer_email: String,
    pub created_at: DateTime<Utc>,
}

impl From<(Review, User, Dish)> for AdminReviewResponse {
    fn from((review, user, dish): (Review, User, Dish)) -> Self {
        Self {
            id: review.id,
            dish_id: review.dish_id,
            dish_title: dish.title,
            rating: review.rating,
            review_text: review.review_text,
            reviewer_name: format!("{} {}", user.first_name, user.last_name),
            reviewer_email: user.email,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    /// Address to subscribe
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    /// Normalized address that was subscribed
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaUploadResponse {
    /// Public URL path of the stored file
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ember_storefront_service::models::DishCategory;

    use super::*;

    #[test]
    fn cart_response_totals_line_items() {
        let user_id = Uuid::new_v4();
        let dish = Dish {
            id: Uuid::new_v4(),
            title: "Bulgogi Bowl".to_string(),
            short_description: "short".to_string(),
            description: "long".to_string(),
            price: "10.00".parse::<BigDecimal>().unwrap(),
            category: DishCategory::MainCourse,
            image_url: None,
            created_by: None,
            created_at: Utc::now(),
        };
        let line = CartLine {
            user_id,
            dish_id: dish.id,
            quantity: 3,
        };

        let response = CartResponse::from_rows(vec![(line, dish)]);

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].line_total, "30.00");
        assert_eq!(response.total, "30.00");
    }
}
