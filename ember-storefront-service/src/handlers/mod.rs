pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod media;
pub mod newsletter;
pub mod orders;
pub mod payloads;
pub mod profile;
pub mod reviews;

// Re-export routers for easier importing
pub use admin::router as admin_router;
pub use auth::router as auth_router;
pub use cart::router as cart_router;
pub use catalog::router as catalog_router;
pub use media::router as media_router;
pub use newsletter::router as newsletter_router;
pub use orders::router as orders_router;
pub use profile::router as profile_router;
pub use reviews::router as reviews_router;

use axum::http::HeaderMap;
use uuid::Uuid;

use ember_storefront_service::auth::{bearer_token, AuthKeys, Session};
use ember_storefront_service::commands::users;
use ember_storefront_service::establish_connection;
use ember_storefront_service::media::MediaStore;
use utoipa::OpenApi;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub keys: AuthKeys,
    pub media: MediaStore,
}

/// Resolves the bearer token to a tri-state session. A missing or invalid
/// token never touches the database, and any role lookup failure collapses
/// to an anonymous session.
fn resolve_session(headers: &HeaderMap, state: &AppState) -> Session {
    let Some(token) = bearer_token(headers) else {
        return Session::Anonymous;
    };
    let Some(user_id) = state.keys.verify(token) else {
        return Session::Anonymous;
    };

    let conn = &mut establish_connection();
    match users::get(conn, &user_id) {
        Ok(user) => Session::from_role(user.id, user.role),
        Err(_) => Session::Anonymous,
    }
}

fn require_user(session: &Session) -> Result<Uuid, ApiError> {
    session.user_id().ok_or(ApiError::AuthenticationRequired)
}

fn require_admin(session: &Session) -> Result<Uuid, ApiError> {
    match session {
        Session::Admin(id) => Ok(*id),
        Session::Customer(_) => Err(ApiError::Forbidden),
        Session::Anonymous => Err(ApiError::AuthenticationRequired),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_user,
        auth::issue_token,
        profile::get_profile,
        profile::update_profile,
        profile::delete_account,
        catalog::list_dishes,
        catalog::get_dish,
        catalog::list_dish_reviews,
        cart::get_cart,
        cart::add_cart_item,
        cart::update_cart_item,
        cart::remove_cart_item,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        orders::cancel_order,
        reviews::submit_review,
        reviews::list_my_reviews,
        reviews::update_review,
        reviews::delete_review,
        newsletter::subscribe,
        media::upload_media,
        admin::create_dish,
        admin::update_dish,
        admin::delete_dish,
        admin::list_all_orders,
        admin::create_order,
        admin::update_order_status,
        admin::delete_order,
        admin::list_all_reviews,
        admin::create_review,
        admin::update_review,
        admin::delete_review,
        admin::list_users,
        admin::create_user,
        admin::update_user,
        admin::delete_user,
    ),
    components(
        schemas(
            payloads::RegisterRequest,
            payloads::IssueTokenRequest,
            payloads::IssueTokenResponse,
            payloads::UserProfile,
            payloads::UpdateProfileRequest,
            payloads::AdminUpdateUserRequest,
            payloads::AdminCreateUserRequest,
            payloads::DishRequest,
            payloads::DishResponse,
            payloads::AddCartItemRequest,
            payloads::UpdateCartItemRequest,
            payloads::CartItemResponse,
            payloads::CartResponse,
            payloads::CheckoutRequest,
            payloads::OrderItemResponse,
            payloads::OrderResponse,
            payloads::UpdateOrderStatusRequest,
            payloads::AdminOrderItemRequest,
            payloads::AdminCreateOrderRequest,
            payloads::SubmitReviewRequest,
            payloads::UpdateReviewRequest,
            payloads::AdminCreateReviewRequest,
            payloads::ReviewResponse,
            payloads::OwnReviewResponse,
            payloads::AdminReviewResponse,
            payloads::SubscribeRequest,
            payloads::SubscriptionResponse,
            payloads::MediaUploadResponse,
            payloads::ApiErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and token endpoints"),
        (name = "profile", description = "Own account endpoints"),
        (name = "catalog", description = "Public menu endpoints"),
        (name = "cart", description = "Cart endpoints"),
        (name = "orders", description = "Checkout and order history endpoints"),
        (name = "reviews", description = "Dish review endpoints"),
        (name = "newsletter", description = "Newsletter subscription endpoints"),
        (name = "media", description = "Image upload endpoints"),
        (name = "admin", description = "Back office endpoints")
    ),
    info(
        title = "Ember Storefront",
        description = "Food ordering storefront and back office",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::*;
            let password_flow = Password::new("/auth/token", Scopes::default());
            components.add_security_scheme(
                "bearer",
                SecurityScheme::OAuth2(OAuth2::new([Flow::Password(password_flow)])),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use ember_storefront_service::auth::Session;
    use uuid::Uuid;

    use super::*;

    async fn spawn_gate_router(media_root: &std::path::Path) -> std::net::SocketAddr {
        let state = AppState {
            keys: AuthKeys::new("gate-test-secret"),
            media: MediaStore::new(media_root, ""),
        };
        let app = Router::new()
            .merge(auth_router())
            .merge(profile_router())
            .merge(catalog_router())
            .merge(cart_router())
            .merge(orders_router())
            .merge(reviews_router())
            .merge(newsletter_router())
            .merge(media_router())
            .merge(admin_router())
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
        addr
    }

    async fn send_json(
        addr: std::net::SocketAddr,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> (u16, String) {
        let payload = body.map(Value::to_string).unwrap_or_default();
        let mut stream = tokio::net::TcpStream::connect(addr)
            .await
            .expect("connect server");
        let request = format!(
            "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
            payload.len(),
        );
        stream
            .write_all(request.as_bytes())
            .await
            .expect("write request");
        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("read response");
        let (head, body) = response
            .split_once("\r\n\r\n")
            .expect("http response must have separator");
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|s| s.parse::<u16>().ok())
            .expect("http status");
        (status, body.to_string())
    }

    // Bodies are well-formed so the status reflects the session gate, not a
    // deserializer rejection. None of these requests may reach the store.
    #[tokio::test]
    async fn anonymous_requests_bounce_off_every_gated_route() {
        let media_dir = tempfile::tempdir().unwrap();
        let addr = spawn_gate_router(media_dir.path()).await;

        let id = Uuid::new_v4();
        let checkout = json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "phone": "555-0100",
            "address": "1 Analytical Row",
            "email": "ada@example.com",
        });
        let review = json!({"dish_id": id, "rating": 5, "review_text": "Lovely"});

        let gated: Vec<(&str, String, Option<Value>)> = vec![
            ("GET", "/cart".to_string(), None),
            ("POST", "/cart".to_string(), Some(json!({"dish_id": id}))),
            ("PUT", format!("/cart/{id}"), Some(json!({"quantity": 2}))),
            ("DELETE", format!("/cart/{id}"), None),
            ("GET", "/orders".to_string(), None),
            ("POST", "/orders".to_string(), Some(checkout)),
            ("GET", format!("/orders/{id}"), None),
            ("DELETE", format!("/orders/{id}"), None),
            ("GET", "/profile".to_string(), None),
            (
                "PUT",
                "/profile".to_string(),
                Some(json!({
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "phone": "555-0100",
                    "address": "1 Analytical Row",
                })),
            ),
            ("DELETE", "/profile".to_string(), None),
            ("GET", "/reviews".to_string(), None),
            ("POST", "/reviews".to_string(), Some(review)),
            (
                "PUT",
                format!("/reviews/{id}"),
                Some(json!({"rating": 4, "review_text": "Fine"})),
            ),
            ("DELETE", format!("/reviews/{id}"), None),
            ("POST", "/uploads/avatars?filename=me.png".to_string(), None),
            ("GET", "/admin/orders".to_string(), None),
            ("GET", "/admin/reviews".to_string(), None),
            ("GET", "/admin/users".to_string(), None),
            ("DELETE", format!("/admin/dishes/{id}"), None),
            (
                "PUT",
                format!("/admin/orders/{id}/status"),
                Some(json!({"status": "SHIPPED"})),
            ),
        ];
        for (method, path, body) in &gated {
            let (status, reply) = send_json(addr, method, path, body.as_ref()).await;
            assert_eq!(status, 401, "{method} {path}");
            let reply: Value = serde_json::from_str(&reply).expect("error json");
            assert_eq!(reply["error"], "Authentication required", "{method} {path}");
        }
    }

    #[tokio::test]
    async fn newsletter_rejects_malformed_addresses_without_a_store() {
        let media_dir = tempfile::tempdir().unwrap();
        let addr = spawn_gate_router(media_dir.path()).await;

        for email in ["", "not-an-address", "two@@example.com"] {
            let (status, reply) =
                send_json(addr, "POST", "/newsletter", Some(&json!({"email": email}))).await;
            assert_eq!(status, 400, "{email:?}");
            let reply: Value = serde_json::from_str(&reply).expect("error json");
            assert_eq!(reply["error"], "A valid email is required");
        }
    }

    #[test]
    fn customer_routes_need_any_signed_in_user() {
        let id = Uuid::new_v4();
        assert_eq!(require_user(&Session::Customer(id)).unwrap(), id);
        assert_eq!(require_user(&Session::Admin(id)).unwrap(), id);
        assert!(matches!(
            require_user(&Session::Anonymous),
            Err(ApiError::AuthenticationRequired)
        ));
    }

    #[test]
    fn admin_routes_turn_customers_away_before_any_content() {
        let id = Uuid::new_v4();
        assert_eq!(require_admin(&Session::Admin(id)).unwrap(), id);
        assert!(matches!(
            require_admin(&Session::Customer(id)),
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            require_admin(&Session::Anonymous),
            Err(ApiError::AuthenticationRequired)
        ));
    }
}
