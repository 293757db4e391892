//! Blog backend service
//!
//! # Architecture Overview
//!
//! ```text
//!   configs/config.yaml ──▶ config ──▶ Settings ─┬─▶ model (MySQL pool)
//!                                                ├─▶ logger (rolling file sink)
//!                                                └─▶ http (axum)
//!
//!   Client ──▶ request id ──▶ access log (per-request Logger) ──▶ handlers
//! ```

use std::path::PathBuf;

use blog_service::config::DEFAULT_CONFIG_PATH;
use blog_service::infof;
use blog_service::lifecycle::{bootstrap, Shutdown};
use blog_service::HttpServer;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blog-service")]
#[command(about = "Blog backend service", long_about = None)]
struct Cli {
    /// Path to the YAML or TOML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Framework diagnostics; application records go through the Logger.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_service=info,tower_http=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let app = bootstrap(&cli.config).inspect_err(|e| {
        tracing::error!(error = %e, "Startup failed");
    })?;

    infof!(app.logger, "{}: go-programming-tour-book/{}", "eddycjy", "blog-service");

    let listener = TcpListener::bind(app.settings.server.bind_address()).await?;

    let shutdown = Shutdown::new();
    shutdown.listen_for_signals(app.logger.clone());

    let server = HttpServer::new(app.settings.clone(), app.logger.clone());
    server.run(listener, shutdown.subscribe()).await?;

    app.db.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
