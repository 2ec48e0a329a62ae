//! Confirmation deadline reminder thresholds.
//!
//! A pending performer is reminded as their deadline approaches. Only the
//! tightest threshold that currently applies is sent, and a spot remembers
//! the tightest threshold already delivered (`last_reminder_hours`), so a
//! spot first seen 30 minutes before its deadline gets one 1-hour reminder
//! rather than three stacked ones.

use serde::Serialize;

/// How often the reminder job runs by default (in seconds).
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 300;

/// Delivery priority attached to a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderPriority {
    Medium,
    High,
}

/// A reminder sent when a deadline is at most `hours` away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderThreshold {
    pub hours: i32,
    pub priority: ReminderPriority,
}

/// Reminder thresholds, loosest first.
pub const REMINDER_THRESHOLDS: &[ReminderThreshold] = &[
    ReminderThreshold {
        hours: 24,
        priority: ReminderPriority::Medium,
    },
    ReminderThreshold {
        hours: 6,
        priority: ReminderPriority::High,
    },
    ReminderThreshold {
        hours: 1,
        priority: ReminderPriority::High,
    },
];

/// The tightest threshold that applies with `hours_remaining` left, if any.
pub fn applicable_threshold(hours_remaining: f64) -> Option<ReminderThreshold> {
    if hours_remaining <= 0.0 {
        return None;
    }
    REMINDER_THRESHOLDS
        .iter()
        .filter(|t| hours_remaining <= f64::from(t.hours))
        .min_by_key(|t| t.hours)
        .copied()
}

/// The reminder to send now, given what was already sent.
///
/// Returns `None` when no threshold applies or when the applicable threshold
/// (or a tighter one) was already delivered.
pub fn reminder_due(
    hours_remaining: f64,
    last_reminder_hours: Option<i32>,
) -> Option<ReminderThreshold> {
    let threshold = applicable_threshold(hours_remaining)?;
    match last_reminder_hours {
        Some(sent) if sent <= threshold.hours => None,
        _ => Some(threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reminder_beyond_a_day() {
        assert_eq!(applicable_threshold(30.0), None);
    }

    #[test]
    fn no_reminder_once_overdue() {
        assert_eq!(applicable_threshold(0.0), None);
        assert_eq!(applicable_threshold(-1.0), None);
    }

    #[test]
    fn picks_tightest_threshold() {
        assert_eq!(applicable_threshold(20.0).map(|t| t.hours), Some(24));
        assert_eq!(applicable_threshold(5.0).map(|t| t.hours), Some(6));
        assert_eq!(applicable_threshold(0.5).map(|t| t.hours), Some(1));
    }

    #[test]
    fn tighter_thresholds_are_high_priority() {
        assert_eq!(
            applicable_threshold(0.5).map(|t| t.priority),
            Some(ReminderPriority::High)
        );
        assert_eq!(
            applicable_threshold(12.0).map(|t| t.priority),
            Some(ReminderPriority::Medium)
        );
    }

    #[test]
    fn already_sent_threshold_is_not_repeated() {
        assert_eq!(reminder_due(20.0, Some(24)), None);
        assert_eq!(reminder_due(5.0, Some(6)), None);
        assert_eq!(reminder_due(5.0, Some(1)), None);
    }

    #[test]
    fn tighter_threshold_fires_after_looser_one() {
        assert_eq!(reminder_due(5.0, Some(24)).map(|t| t.hours), Some(6));
        assert_eq!(reminder_due(0.5, Some(6)).map(|t| t.hours), Some(1));
        assert_eq!(reminder_due(0.5, None).map(|t| t.hours), Some(1));
    }
}
