//! Standalone lifecycle worker.
//!
//! Runs the expiry sweep and deadline reminders on their intervals and
//! delivers the resulting notifications, for deployments where the API
//! processes run with `RUN_SCHEDULER` off.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lineup_core::clock::SystemClock;
use lineup_core::config::{env_or, env_required};
use lineup_db::store::PgSpotStore;
use lineup_db::DEFAULT_MAX_CONNECTIONS;
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

    let engine_config = EngineConfig::from_env()?;
    let max_connections: u32 = env_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
    let shutdown_timeout = Duration::from_secs(env_or("SHUTDOWN_TIMEOUT_SECS", 30u64)?);
    tracing::info!(
        sweep_interval_secs = engine_config.sweep_interval.as_secs(),
        reminder_interval_secs = engine_config.reminder_interval.as_secs(),
        batch_size = engine_config.sweep_batch_size,
        "Worker starting"
    );

    let database_url = env_required("DATABASE_URL")?;
    let pool = lineup_db::create_pool(&database_url, max_connections)
        .await
        .context("Failed to connect to database")?;
    lineup_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    let event_bus = Arc::new(EventBus::default());
    let dispatcher: Arc<dyn NotificationDispatcher> = match std::env::var("NOTIFY_WEBHOOK_URL")
    {
        Ok(url) if !url.trim().is_empty() => Arc::new(WebhookDispatcher::new(url)?),
        _ => Arc::new(LogDispatcher),
    };
    let dispatch_cancel = CancellationToken::new();
    let dispatch_handle = tokio::spawn(
        DispatchWorker::new(dispatcher).run(event_bus.subscribe(), dispatch_cancel.clone()),
    );

    let service = Arc::new(SpotService::new(
        Arc::new(PgSpotStore::new(pool)),
        Arc::new(SystemClock),
        event_bus,
        engine_config,
    ));
    let scheduler = Scheduler::start(service);

    shutdown_signal().await;

    scheduler.stop(shutdown_timeout).await;
    dispatch_cancel.cancel();
    if tokio::time::timeout(shutdown_timeout, dispatch_handle)
        .await
        .is_err()
    {
        tracing::warn!("Dispatch worker did not stop within timeout");
    }

    tracing::info!("Worker stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lineup_worker=debug,lineup_engine=debug,lineup_events=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

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
        () = ctrl_c => tracing::info!("Received SIGINT, stopping worker"),
        () = terminate => tracing::info!("Received SIGTERM, stopping worker"),
    }
}
