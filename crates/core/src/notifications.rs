//! Notification kinds emitted by the spot lifecycle.
//!
//! The lifecycle only requests that a notification be sent; delivery belongs
//! to whichever dispatcher consumes the event bus. Each kind maps to the
//! dotted event type string carried on the bus.

use serde::{Deserialize, Serialize};

/// Source entity type used on spot lifecycle events.
pub const SPOT_ENTITY: &str = "spot";

/// Source entity type used on event-level lifecycle events.
pub const EVENT_ENTITY: &str = "event";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// A performer was offered a spot (to the performer).
    #[serde(rename = "spot.assigned")]
    SpotAssigned,
    /// A performer accepted (to the promoter).
    #[serde(rename = "spot.confirmed")]
    SpotConfirmed,
    /// A performer declined (to the promoter).
    #[serde(rename = "spot.declined")]
    SpotDeclined,
    /// The offer lapsed (to the performer).
    #[serde(rename = "spot.expired")]
    SpotExpired,
    /// A lapsed spot is open again (to the promoter).
    #[serde(rename = "spot.reopened")]
    SpotReopened,
    #[serde(rename = "spot.deadline_reminder")]
    DeadlineReminder,
    #[serde(rename = "spot.deadline_extended")]
    DeadlineExtended,
    /// Every spot on the event is confirmed (to the promoter).
    #[serde(rename = "event.lineup_complete")]
    LineupComplete,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 8] = [
        NotificationKind::SpotAssigned,
        NotificationKind::SpotConfirmed,
        NotificationKind::SpotDeclined,
        NotificationKind::SpotExpired,
        NotificationKind::SpotReopened,
        NotificationKind::DeadlineReminder,
        NotificationKind::DeadlineExtended,
        NotificationKind::LineupComplete,
    ];

    /// The event type string published on the bus.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::SpotAssigned => "spot.assigned",
            NotificationKind::SpotConfirmed => "spot.confirmed",
            NotificationKind::SpotDeclined => "spot.declined",
            NotificationKind::SpotExpired => "spot.expired",
            NotificationKind::SpotReopened => "spot.reopened",
            NotificationKind::DeadlineReminder => "spot.deadline_reminder",
            NotificationKind::DeadlineExtended => "spot.deadline_extended",
            NotificationKind::LineupComplete => "event.lineup_complete",
        }
    }

    /// Parse an event type string back into a kind.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == event_type)
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_strings_round_trip() {
        for kind in NotificationKind::ALL {
            assert_eq!(NotificationKind::from_event_type(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::from_event_type("job.completed"), None);
    }

    #[test]
    fn serializes_as_event_type() {
        let json = serde_json::to_value(NotificationKind::SpotReopened).unwrap();
        assert_eq!(json, "spot.reopened");
    }
}
