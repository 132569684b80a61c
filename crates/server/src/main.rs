//! Depot server binary.

use anyhow::{Context, Result};
use clap::Parser;
use depot_core::config::AppConfig;
use depot_engine::{Depot, MigrationQueue};
use depot_metadata::{MetadataStore, SqliteStore};
use depot_server::{AppState, create_router};
use depot_storage::TierStore;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Depot - a LAN-local tiered file service
#[derive(Parser, Debug)]
#[command(name = "depotd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "DEPOT_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Depot v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("DEPOT_") && key != "DEPOT_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: depotd --config /path/to/config.toml\n  \
             2. Environment variables: DEPOT_STORAGE__CACHE_ROOT=/mnt/ssd_cache \
             DEPOT_STORAGE__STORAGE_ROOT=/mnt/bulk DEPOT_METADATA__DB_PATH=/var/lib/depot/metadata.db depotd\n\n\
             See config/server.example.toml for example configuration.\n\
             Set DEPOT_CONFIG env var to specify a default config file path."
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("DEPOT_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .context("invalid configuration")?;

    // Initialize the tier store
    let tiers = Arc::new(
        TierStore::new(&config.storage.cache_root, &config.storage.storage_root)
            .await
            .context("failed to initialize tier store")?,
    );
    tiers
        .health_check()
        .await
        .context("tier root health check failed")?;
    tracing::info!(
        cache_root = %config.storage.cache_root.display(),
        storage_root = %config.storage.storage_root.display(),
        "Tier store initialized"
    );

    // Initialize the metadata store
    let metadata: Arc<dyn MetadataStore> = Arc::new(
        SqliteStore::new(&config.metadata.db_path)
            .await
            .context("failed to initialize metadata store")?,
    );
    tracing::info!(db_path = %config.metadata.db_path.display(), "Metadata store initialized");

    // Start the migration queue and its single worker
    let queue = MigrationQueue::new(
        Arc::clone(&tiers),
        Arc::clone(&metadata),
        config.migration.max_queued_bytes,
    );
    let worker = queue.spawn_worker();

    let depot = Arc::new(Depot::new(
        metadata,
        tiers,
        Arc::clone(&queue),
        config.server.max_upload_bytes,
    ));

    // Create application state and router
    let bind = config.server.bind.clone();
    let state = AppState::new(config, depot);
    let app = create_router(state);

    let addr: SocketAddr = bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let the worker finish the item it is on; undrained items stay in the
    // cache tier, so only their promotion is lost, never bytes.
    tracing::info!("HTTP server stopped; stopping migration worker");
    queue.shutdown();
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "migration worker did not stop cleanly");
    }

    Ok(())
}

/// Resolve when SIGINT (or SIGTERM on unix) is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
