//! `horded`: the zombie catalogue server.
//!
//! Usage:
//!   horded --db <url> [--listen <addr>] [--cache-ttl-secs <n>] [--no-cache]
//!
//! The database url is `redb:<path>`, `redb://<path>`, a bare path to a
//! redb file, or `memory:`. Every flag also reads from the environment,
//! and a `.env` file in the working directory is loaded first.

mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use horde_core::{CacheConfig, Module, ServiceConfig, StoreLocation};
use horde_kv::{KVStore, RedbStore};
use tokio::signal;
use tracing::{info, warn};

/// Zombie catalogue server.
#[derive(Parser, Debug)]
#[command(name = "horded", about = "Zombie catalogue server")]
struct Cli {
    /// Document store connection string.
    #[arg(long = "db", env = "HORDE_DB_URL")]
    db: String,

    /// Listen address.
    #[arg(long = "listen", env = "HORDE_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Lifetime of cached GET responses, in seconds.
    #[arg(long = "cache-ttl-secs", env = "HORDE_CACHE_TTL_SECS", default_value_t = 5)]
    cache_ttl_secs: u64,

    /// Maximum number of cached GET responses.
    #[arg(long = "cache-capacity", env = "HORDE_CACHE_CAPACITY", default_value_t = 10)]
    cache_capacity: u64,

    /// Serve every GET from the store.
    #[arg(long = "no-cache", env = "HORDE_NO_CACHE")]
    no_cache: bool,
}

impl Cli {
    fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            database_url: self.db,
            listen: self.listen,
            cache: CacheConfig {
                enabled: !self.no_cache,
                ttl: Duration::from_secs(self.cache_ttl_secs),
                capacity: self.cache_capacity,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Cli::parse().into_config();

    // Open the document store.
    let location = config.store_location()?;
    let kv: Arc<dyn KVStore> = match &location {
        StoreLocation::File(path) => {
            info!("Opening document store at {}", path.display());
            Arc::new(
                RedbStore::open(path)
                    .map_err(|e| anyhow::anyhow!("failed to open document store: {}", e))?,
            )
        }
        StoreLocation::Memory => {
            warn!("Using an in-memory document store; data is lost at shutdown");
            Arc::new(
                RedbStore::open_in_memory()
                    .map_err(|e| anyhow::anyhow!("failed to open document store: {}", e))?,
            )
        }
    };

    let zombie_module = zombie::ZombieModule::new(Arc::clone(&kv), &config.cache);
    info!(
        cache = config.cache.enabled,
        ttl_secs = config.cache.ttl.as_secs(),
        "{} module initialized",
        zombie_module.name()
    );

    let app = routes::build_router(
        vec![(zombie_module.name(), zombie_module.routes())],
        zombie::api::openapi(),
    );

    // Start server.
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("horded listening on {}", config.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(zombie_module);
    drop(kv);
    info!("Document store closed");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_builds_service_config() {
        let cli = Cli::parse_from([
            "horded",
            "--db",
            "redb:/tmp/horde.redb",
            "--cache-ttl-secs",
            "30",
            "--no-cache",
        ]);
        let config = cli.into_config();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl, Duration::from_secs(30));
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(
            config.store_location().unwrap(),
            StoreLocation::File("/tmp/horde.redb".into())
        );
    }

    #[test]
    fn db_url_is_required() {
        // Only meaningful when the environment does not provide it.
        if std::env::var_os("HORDE_DB_URL").is_none() {
            assert!(Cli::try_parse_from(["horded"]).is_err());
        }
    }
}
