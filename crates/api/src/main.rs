use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lineup_api::config::ServerConfig;
use lineup_api::router::build_app_router;
use lineup_api::state::AppState;
use lineup_core::clock::SystemClock;
use lineup_core::config::env_required;
use lineup_db::store::PgSpotStore;
use lineup_engine::{EngineConfig, Scheduler, SpotService};
use lineup_events::{
    DispatchWorker, EventBus, LogDispatcher, NotificationDispatcher, WebhookDispatcher,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    let engine_config = EngineConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = env_required("DATABASE_URL")?;
    let pool = lineup_db::create_pool(&database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    lineup_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    lineup_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Event bus and notification delivery ---
    let event_bus = Arc::new(EventBus::default());
    let dispatcher: Arc<dyn NotificationDispatcher> = match &config.notify_webhook_url {
        Some(url) => {
            tracing::info!(%url, "Delivering notifications to webhook");
            Arc::new(WebhookDispatcher::new(url.clone())?)
        }
        None => Arc::new(LogDispatcher),
    };
    let dispatch_cancel = CancellationToken::new();
    let dispatch_handle = tokio::spawn(
        DispatchWorker::new(dispatcher).run(event_bus.subscribe(), dispatch_cancel.clone()),
    );

    // --- Lifecycle engine ---
    let service = Arc::new(SpotService::new(
        Arc::new(PgSpotStore::new(pool)),
        Arc::new(SystemClock),
        Arc::clone(&event_bus),
        engine_config,
    ));
    let scheduler = if config.run_scheduler {
        tracing::info!("Starting in-process sweep and reminder scheduler");
        Some(Scheduler::start(Arc::clone(&service)))
    } else {
        None
    };

    // --- Router ---
    let state = AppState {
        service,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    if let Some(scheduler) = scheduler {
        scheduler.stop(drain).await;
    }

    dispatch_cancel.cancel();
    if tokio::time::timeout(drain, dispatch_handle).await.is_err() {
        tracing::warn!("Dispatch worker did not stop within timeout");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lineup_api=debug,lineup_engine=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
