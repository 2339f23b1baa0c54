use clap::{Parser, Subcommand};

pub mod app;
mod error;
mod handlers;

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the storefront and back-office HTTP API
    Serve,
    /// Deliver queued mail through the mailer relay
    Notifier,
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Serve => app::http::main().await,
        Commands::Notifier => app::notifier::main().await,
    }
}
