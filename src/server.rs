//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, key-value store and optimizer selection,
//! and the Axum server lifecycle.

use crate::application::services::ImageSettings;
use crate::config::Config;
use crate::deps::Deps;
use crate::infrastructure::kv::{KvStore, NullStore, RedisStore};
use crate::infrastructure::optimizer::{ImageOptimizer, PassthroughOptimizer, RemoteOptimizer};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

const DB_CONNECT_ATTEMPTS: usize = 5;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (retried with exponential backoff)
/// - Apply migrations
/// - Redis store (or NullStore fallback)
/// - Remote optimizer (or passthrough fallback)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails after all retries
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let kv = connect_kv(&config).await;
    let optimizer = build_optimizer(&config)?;

    let deps = Deps::postgres(Arc::new(pool), kv, optimizer);
    let state = AppState::from_deps(
        deps,
        ImageSettings {
            public_base_url: config.public_base_url.clone(),
            cache_ttl: config.image_cache_ttl(),
        },
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(200)
        .factor(2)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(DB_CONNECT_ATTEMPTS);

    Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "Database connection failed, retrying"))
        }
    })
    .await
    .context("Failed to connect to database")
}

async fn connect_kv(config: &Config) -> Arc<dyn KvStore> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Image cache disabled (NullStore)");
        return Arc::new(NullStore::new());
    };

    match RedisStore::connect(redis_url, config.image_cache_ttl()).await {
        Ok(redis) => {
            tracing::info!("Image cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullStore.", e);
            Arc::new(NullStore::new())
        }
    }
}

fn build_optimizer(config: &Config) -> Result<Arc<dyn ImageOptimizer>> {
    match &config.optimizer_url {
        Some(url) => {
            let optimizer = RemoteOptimizer::new(url, config.optimizer_timeout())
                .context("Failed to build optimizer client")?;
            tracing::info!("Image optimizer: {}", url);
            Ok(Arc::new(optimizer))
        }
        None => {
            tracing::info!("No image optimizer configured, serving originals only");
            Ok(Arc::new(PassthroughOptimizer))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
