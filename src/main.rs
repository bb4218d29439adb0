//! `ipl` - IPL delivery ingestion and analytics API.

use ipl_analytics::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "ipl_analytics=info"
    } else {
        "ipl_analytics=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = cli::run().await {
        eprintln!("{} {:#}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
