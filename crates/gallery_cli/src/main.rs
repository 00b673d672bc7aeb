//! BucketGallery - S3 File Gallery Command-Line Client
//!
//! Main entry point for the gallery binary.

mod app;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env; absence is fine
    let _ = dotenvy::dotenv();

    // Initialize logging and panic hook first
    gallery_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = gallery_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("BucketGallery starting...");

    app::run(app::Cli::parse()).await
}
