use axum::Router;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ember_storefront_service::auth::AuthKeys;
use ember_storefront_service::establish_connection;
use ember_storefront_service::media::MediaStore;

use crate::handlers::{
    admin_router, auth_router, cart_router, catalog_router, media_router, newsletter_router,
    orders_router, profile_router, reviews_router, ApiDoc, AppState,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let conn = &mut establish_connection();
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Error while running migrations");

    let state = AppState {
        keys: AuthKeys::from_env(),
        media: MediaStore::from_env(),
    };
    let media_root = state.media.root().clone();

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
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/media", ServeDir::new(media_root))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8150").await?;
    info!("Storefront listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
