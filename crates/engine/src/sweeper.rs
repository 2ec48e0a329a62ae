//! Expiry of lapsed offers.

use std::collections::HashMap;

use lineup_core::notifications::NotificationKind;
use lineup_core::types::DbId;
use lineup_db::models::spot::DeadlineCursor;
use lineup_events::PlatformEvent;
use serde::Serialize;

use crate::error::EngineError;
use crate::service::SpotService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub expired_count: u64,
    /// Notifications requested; up to two per expired spot.
    pub notification_count: u64,
    /// Rows whose expiry write failed and were skipped.
    pub failed_count: u64,
}

impl SpotService {
    /// Expire every pending spot whose deadline is at or before now.
    ///
    /// Each due row gets its own conditional write, so a spot confirmed or
    /// declined mid-sweep is left alone and a second immediate run expires
    /// nothing. Per-row failures are logged and skipped; paging continues
    /// past them on a `(deadline, id)` cursor until a short page.
    pub async fn sweep_expired(&self) -> Result<SweepReport, EngineError> {
        let now = self.now();
        let limit = self.config.sweep_batch_size;
        let mut report = SweepReport::default();
        let mut promoters: HashMap<DbId, Option<DbId>> = HashMap::new();
        let mut after: Option<DeadlineCursor> = None;

        loop {
            let due = self
                .with_retry("list_due_pending", || {
                    self.store.list_due_pending(now, after, limit)
                })
                .await?;
            let fetched = due.len();
            if let Some(last) = due.last().and_then(DeadlineCursor::of) {
                after = Some(last);
            }

            for spot in due {
                let Some(performer_id) = spot.performer_id else {
                    tracing::warn!(spot_id = spot.id, "Pending spot without performer, skipping");
                    report.failed_count += 1;
                    continue;
                };

                match self.store.expire_pending(spot.id, performer_id, now).await {
                    Ok(Some(expired)) => {
                        report.expired_count += 1;
                        tracing::info!(
                            spot_id = expired.id,
                            event_id = expired.event_id,
                            performer_id,
                            "Spot expired"
                        );

                        let payload = serde_json::json!({
                            "event_id": expired.event_id,
                            "spot_type": expired.spot_type,
                            "performer_id": performer_id,
                            "expired_deadline": spot.confirmation_deadline,
                        });
                        self.notify(
                            PlatformEvent::for_spot(
                                NotificationKind::SpotExpired,
                                expired.id,
                                performer_id,
                            )
                            .with_payload(payload.clone()),
                        );
                        report.notification_count += 1;

                        if let Some(promoter_id) =
                            self.promoter_of(&mut promoters, expired.event_id).await
                        {
                            self.notify(
                                PlatformEvent::for_spot(
                                    NotificationKind::SpotReopened,
                                    expired.id,
                                    promoter_id,
                                )
                                .with_payload(payload),
                            );
                            report.notification_count += 1;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!(spot_id = spot.id, "Spot resolved before expiry");
                    }
                    Err(e) => {
                        report.failed_count += 1;
                        tracing::error!(spot_id = spot.id, error = %e, "Failed to expire spot");
                    }
                }
            }

            if (fetched as i64) < limit {
                break;
            }
        }

        if report.expired_count > 0 || report.failed_count > 0 {
            tracing::info!(
                expired = report.expired_count,
                notifications = report.notification_count,
                failed = report.failed_count,
                "Expiry sweep finished"
            );
        } else {
            tracing::debug!("Expiry sweep: nothing due");
        }
        Ok(report)
    }

    async fn promoter_of(
        &self,
        cache: &mut HashMap<DbId, Option<DbId>>,
        event_id: DbId,
    ) -> Option<DbId> {
        if let Some(cached) = cache.get(&event_id) {
            return *cached;
        }
        let promoter_id = self
            .event_for_notification(event_id)
            .await
            .map(|e| e.promoter_id);
        cache.insert(event_id, promoter_id);
        promoter_id
    }
}
