//! Urgency classification for pending confirmations.
//!
//! Buckets are derived from the time remaining until a spot's confirmation
//! deadline, measured against an explicit `now`:
//!
//! | standing         | hours until deadline |
//! |------------------|----------------------|
//! | `awaiting_sweep` | `<= 0`               |
//! | `critical`       | `(0, 1]`             |
//! | `urgent`         | `(1, 6]`             |
//! | `upcoming`       | `(6, 24]`            |
//! | `later`          | `> 24`               |
//!
//! Overdue spots never count as critical; they are reported on their own
//! until the expiry sweep picks them up.

use chrono::{NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::spot_lifecycle::state_machine::{CONFIRMED, EXPIRED, PENDING};
use crate::types::Timestamp;

pub const CRITICAL_HOURS: f64 = 1.0;
pub const URGENT_HOURS: f64 = 6.0;
pub const UPCOMING_HOURS: f64 = 24.0;

/// Where a pending spot sits relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStanding {
    AwaitingSweep,
    Critical,
    Urgent,
    Upcoming,
    Later,
}

/// Fractional hours from `now` until `deadline` (negative once passed).
pub fn hours_until(deadline: Timestamp, now: Timestamp) -> f64 {
    (deadline - now).num_seconds() as f64 / 3600.0
}

/// Classify a remaining-time value in hours.
pub fn standing_for_hours(hours: f64) -> DeadlineStanding {
    if hours <= 0.0 {
        DeadlineStanding::AwaitingSweep
    } else if hours <= CRITICAL_HOURS {
        DeadlineStanding::Critical
    } else if hours <= URGENT_HOURS {
        DeadlineStanding::Urgent
    } else if hours <= UPCOMING_HOURS {
        DeadlineStanding::Upcoming
    } else {
        DeadlineStanding::Later
    }
}

/// Classify a deadline against `now`.
pub fn standing(deadline: Timestamp, now: Timestamp) -> DeadlineStanding {
    standing_for_hours(hours_until(deadline, now))
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: Timestamp) -> Timestamp {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// Aggregate statistics
// ---------------------------------------------------------------------------

/// Promoter-wide confirmation statistics, recomputed on every dashboard read.
///
/// `expiring_24h` includes the spots counted in `expiring_6h`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeadlineStats {
    pub total_pending: i64,
    pub expiring_24h: i64,
    pub expiring_6h: i64,
    pub expired_today: i64,
    pub confirmed_today: i64,
}

impl DeadlineStats {
    /// Fold one spot's current state into the totals.
    pub fn record(
        &mut self,
        status_id: i16,
        deadline: Option<Timestamp>,
        confirmed_at: Option<Timestamp>,
        expired_at: Option<Timestamp>,
        now: Timestamp,
    ) {
        let today = start_of_day(now);
        match status_id {
            PENDING => {
                self.total_pending += 1;
                if let Some(deadline) = deadline {
                    let hours = hours_until(deadline, now);
                    if hours > 0.0 && hours <= UPCOMING_HOURS {
                        self.expiring_24h += 1;
                    }
                    if hours > 0.0 && hours <= URGENT_HOURS {
                        self.expiring_6h += 1;
                    }
                }
            }
            CONFIRMED => {
                if confirmed_at.is_some_and(|at| at >= today) {
                    self.confirmed_today += 1;
                }
            }
            EXPIRED => {
                if expired_at.is_some_and(|at| at >= today) {
                    self.expired_today += 1;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 1, 15, 30, 0).unwrap()
    }

    #[test]
    fn buckets_by_hours_remaining() {
        assert_eq!(standing_for_hours(0.5), DeadlineStanding::Critical);
        assert_eq!(standing_for_hours(3.0), DeadlineStanding::Urgent);
        assert_eq!(standing_for_hours(10.0), DeadlineStanding::Upcoming);
        assert_eq!(standing_for_hours(30.0), DeadlineStanding::Later);
    }

    #[test]
    fn bucket_upper_bounds_are_inclusive() {
        assert_eq!(standing_for_hours(1.0), DeadlineStanding::Critical);
        assert_eq!(standing_for_hours(6.0), DeadlineStanding::Urgent);
        assert_eq!(standing_for_hours(24.0), DeadlineStanding::Upcoming);
    }

    #[test]
    fn overdue_is_not_critical() {
        assert_eq!(standing_for_hours(0.0), DeadlineStanding::AwaitingSweep);
        assert_eq!(standing_for_hours(-2.0), DeadlineStanding::AwaitingSweep);
    }

    #[test]
    fn hours_until_is_fractional() {
        let deadline = now() + Duration::minutes(90);
        assert!((hours_until(deadline, now()) - 1.5).abs() < f64::EPSILON);
        assert_eq!(standing(deadline, now()), DeadlineStanding::Urgent);
    }

    #[test]
    fn start_of_day_is_utc_midnight() {
        assert_eq!(
            start_of_day(now()),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn stats_count_expiring_windows_inclusively() {
        let mut stats = DeadlineStats::default();
        stats.record(PENDING, Some(now() + Duration::hours(2)), None, None, now());
        stats.record(PENDING, Some(now() + Duration::hours(12)), None, None, now());
        stats.record(PENDING, Some(now() + Duration::hours(48)), None, None, now());
        stats.record(PENDING, Some(now() - Duration::hours(1)), None, None, now());

        assert_eq!(stats.total_pending, 4);
        assert_eq!(stats.expiring_24h, 2);
        assert_eq!(stats.expiring_6h, 1);
    }

    #[test]
    fn stats_only_count_todays_resolutions() {
        let mut stats = DeadlineStats::default();
        let earlier_today = now() - Duration::hours(3);
        let yesterday = now() - Duration::hours(20);

        stats.record(CONFIRMED, None, Some(earlier_today), None, now());
        stats.record(CONFIRMED, None, Some(yesterday), None, now());
        stats.record(EXPIRED, None, None, Some(earlier_today), now());
        stats.record(EXPIRED, None, None, Some(yesterday), now());

        assert_eq!(stats.confirmed_today, 1);
        assert_eq!(stats.expired_today, 1);
        assert_eq!(stats.total_pending, 0);
    }
}
