//! Owned periodic driver for the expiry sweep and deadline reminders.
//!
//! [`Scheduler::start`] spawns one loop per job on `tokio::time::interval`;
//! [`Scheduler::stop`] cancels them and waits for in-flight runs to finish.
//! Both jobs are also plain methods on [`SpotService`] for manual triggers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::service::SpotService;

pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the sweep and reminder loops. Each runs once immediately, then
    /// on its configured interval.
    pub fn start(service: Arc<SpotService>) -> Self {
        let cancel = CancellationToken::new();
        let sweep_interval = service.config().sweep_interval;
        let reminder_interval = service.config().reminder_interval;

        let handles = vec![
            tokio::spawn(run_sweeps(
                Arc::clone(&service),
                sweep_interval,
                cancel.clone(),
            )),
            tokio::spawn(run_reminders(service, reminder_interval, cancel.clone())),
        ];

        Self { cancel, handles }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel both loops and wait up to `timeout` for each to exit.
    pub async fn stop(self, timeout: Duration) {
        self.cancel.cancel();
        for handle in self.handles {
            if tokio::time::timeout(timeout, handle).await.is_err() {
                tracing::warn!("Scheduler task did not stop within timeout");
            }
        }
        tracing::info!("Scheduler stopped");
    }
}

async fn run_sweeps(service: Arc<SpotService>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Expiry sweep job started");
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = service.sweep_expired().await {
                    tracing::error!(error = %e, "Expiry sweep failed");
                }
            }
        }
    }
}

async fn run_reminders(service: Arc<SpotService>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Deadline reminder job started");
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Deadline reminder job stopping");
                break;
            }
            _ = interval.tick() => {
                match service.send_due_reminders().await {
                    Ok(report) if report.reminders_sent > 0 => {
                        tracing::info!(sent = report.reminders_sent, "Deadline reminders sent");
                    }
                    Ok(_) => tracing::debug!("Deadline reminders: nothing due"),
                    Err(e) => tracing::error!(error = %e, "Deadline reminder run failed"),
                }
            }
        }
    }
}
