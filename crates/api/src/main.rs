use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use guardian_api::background::reading_retention;
use guardian_api::config::{LogFormat, ServerConfig};
use guardian_api::router::build_app_router;
use guardian_api::state::AppState;
use guardian_events::LiveHub;
use guardian_ingest::mqtt::run_subscriber;
use guardian_ingest::{IngestConfig, IngestPipeline, IngestStats, PgStores};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "guardian_api=debug,guardian_ingest=debug,tower_http=debug";

/// How long each background task gets to stop after shutdown starts.
const TASK_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let ingest_config = IngestConfig::from_env();

    // --- Tracing ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = guardian_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    guardian_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    guardian_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Live hub and ingestion ---
    let hub = Arc::new(LiveHub::new(ingest_config.live_buffer_capacity));
    let ingest_stats = Arc::new(IngestStats::new());
    let pipeline = Arc::new(IngestPipeline::new(
        PgStores::new(pool.clone()),
        Arc::clone(&hub),
        Arc::clone(&ingest_stats),
        ingest_config.pipeline_settings(),
    ));

    let cancel = CancellationToken::new();
    let subscriber_handle = tokio::spawn(run_subscriber(
        ingest_config,
        pipeline,
        cancel.child_token(),
    ));

    // --- Background jobs ---
    let retention_handle = config.reading_retention_days.map(|days| {
        tokio::spawn(reading_retention::run(
            pool.clone(),
            days,
            reading_retention::CLEANUP_INTERVAL,
            cancel.child_token(),
        ))
    });

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        hub: Arc::clone(&hub),
        ingest_stats,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    if tokio::time::timeout(TASK_STOP_TIMEOUT * 3, subscriber_handle)
        .await
        .is_err()
    {
        tracing::warn!("MQTT subscriber did not stop in time");
    }
    if let Some(handle) = retention_handle {
        let _ = tokio::time::timeout(TASK_STOP_TIMEOUT, handle).await;
        tracing::info!("Reading retention job stopped");
    }

    tracing::info!(
        live_subscribers = hub.subscriber_count(),
        "Closing remaining live subscriptions"
    );
    hub.close_all();

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
