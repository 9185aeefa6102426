use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relation_api::adapters::http::{api_router, ApiHandlers};
use relation_api::adapters::postgres::{
    PostgresActivityLog, PostgresNotificationSink, PostgresStore,
};
use relation_api::config::{AppConfig, LogFormat, ServerConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Loaded configuration"
    );

    // --- Database ---
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.connect_timeout())
        .connect(&config.database.url)
        .await?;
    tracing::info!("Database connection pool created");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // --- Handlers ---
    let handlers = ApiHandlers::new(
        Arc::new(PostgresStore::new(pool.clone())),
        Arc::new(PostgresActivityLog::new(pool.clone())),
        Arc::new(PostgresNotificationSink::new(pool.clone())),
        &config.pipeline,
    );
    let app = api_router(handlers, config.server.request_timeout());

    // --- Start server ---
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
