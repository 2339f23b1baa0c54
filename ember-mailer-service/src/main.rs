use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use ember_mailer_service::handlers::{router, AppState};
use ember_mailer_service::provider::MailProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let state = AppState {
        provider: MailProvider::from_env(),
    };
    let app = router().with_state(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8151").await?;
    info!("Mailer listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
