//! Deadline reminders for pending offers.

use chrono::Duration;
use lineup_core::notifications::NotificationKind;
use lineup_core::reminders::reminder_due;
use lineup_core::urgency::{hours_until, UPCOMING_HOURS};
use lineup_db::models::spot::DeadlineCursor;
use lineup_events::PlatformEvent;
use serde::Serialize;

use crate::error::EngineError;
use crate::service::SpotService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    pub reminders_sent: u64,
}

impl SpotService {
    /// Remind performers whose deadline falls within the next 24 hours.
    ///
    /// Only the tightest applicable threshold is sent, and only if it (or a
    /// tighter one) has not gone out already.
    pub async fn send_due_reminders(&self) -> Result<ReminderReport, EngineError> {
        let now = self.now();
        let until = now + Duration::hours(UPCOMING_HOURS as i64);
        let limit = self.config.sweep_batch_size;
        let mut report = ReminderReport::default();
        let mut after = DeadlineCursor::past(now);

        loop {
            let spots = self
                .with_retry("list_pending_deadlines_between", || {
                    self.store.list_pending_deadlines_between(after, until, limit)
                })
                .await?;
            let fetched = spots.len();

            for spot in &spots {
                let (Some(deadline), Some(performer_id)) =
                    (spot.confirmation_deadline, spot.performer_id)
                else {
                    continue;
                };
                let hours = hours_until(deadline, now);
                let Some(threshold) = reminder_due(hours, spot.last_reminder_hours) else {
                    continue;
                };

                match self
                    .store
                    .mark_reminder_sent(spot.id, threshold.hours, now)
                    .await
                {
                    Ok(Some(_)) => {
                        report.reminders_sent += 1;
                        tracing::info!(
                            spot_id = spot.id,
                            performer_id,
                            threshold_hours = threshold.hours,
                            "Deadline reminder sent"
                        );
                        self.notify(
                            PlatformEvent::for_spot(
                                NotificationKind::DeadlineReminder,
                                spot.id,
                                performer_id,
                            )
                            .with_payload(serde_json::json!({
                                "event_id": spot.event_id,
                                "spot_type": spot.spot_type,
                                "threshold_hours": threshold.hours,
                                "priority": threshold.priority,
                                "hours_remaining": hours,
                                "confirmation_deadline": deadline,
                            })),
                        );
                    }
                    Ok(None) => {
                        tracing::debug!(spot_id = spot.id, "Reminder already recorded");
                    }
                    Err(e) => {
                        tracing::error!(spot_id = spot.id, error = %e, "Failed to record reminder");
                    }
                }
            }

            match spots.last().and_then(DeadlineCursor::of) {
                Some(last) if (fetched as i64) >= limit => after = last,
                _ => break,
            }
        }

        Ok(report)
    }
}
