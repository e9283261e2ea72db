use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roombook::config::Config;
use roombook::AppState;

#[derive(Parser, Debug)]
#[command(name = "roombook")]
#[command(author, version, about = "Room and resource booking server", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "ROOMBOOK_CONFIG", default_value = "roombook.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting roombook v{}", env!("CARGO_PKG_VERSION"));
    if cli.config.exists() {
        tracing::info!("Loaded configuration from {}", cli.config.display());
    } else {
        tracing::info!(
            "No config file at {}, using defaults",
            cli.config.display()
        );
    }

    std::fs::create_dir_all(&config.server.uploads_dir).with_context(|| {
        format!(
            "Failed to create uploads directory: {}",
            config.server.uploads_dir.display()
        )
    })?;

    // Open the store
    let db = roombook::db::init(&config.database).await?;

    let state = Arc::new(AppState::new(config.clone(), db.clone()));

    // Seed the admin account if one is configured
    if let Some(admin) = config.auth.admin_account() {
        state.auth.ensure_admin(&admin).await?;
    }

    tracing::info!(
        "Read failure policy: {:?}",
        state.bookings.read_policy()
    );

    let app = roombook::api::create_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
