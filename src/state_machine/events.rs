use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events that can trigger reservation state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ReservationEvent {
    /// Place a provisional, time-limited claim on the seat
    Hold { ttl: Duration },
    /// Convert a held seat into a sold one
    Confirm,
    /// Give up a provisional claim
    Release,
    /// Reclaim a held seat whose hold has lapsed
    ExpireIfStale,
    /// Return a sold seat to inventory (ticket cancellation)
    Cancel,
}

impl ReservationEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Hold { .. } => "hold",
            Self::Confirm => "confirm",
            Self::Release => "release",
            Self::ExpireIfStale => "expire_if_stale",
            Self::Cancel => "cancel",
        }
    }

    /// Check if this event returns the seat to inventory
    pub fn releases_seat(&self) -> bool {
        matches!(self, Self::Release | Self::ExpireIfStale | Self::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let hold = ReservationEvent::Hold {
            ttl: Duration::from_secs(900),
        };
        assert_eq!(hold.event_type(), "hold");
        assert_eq!(ReservationEvent::ExpireIfStale.event_type(), "expire_if_stale");
    }

    #[test]
    fn test_releasing_events() {
        assert!(ReservationEvent::Release.releases_seat());
        assert!(ReservationEvent::Cancel.releases_seat());
        assert!(!ReservationEvent::Confirm.releases_seat());
    }

    #[test]
    fn test_event_serde_round_trip() {
        let event = ReservationEvent::Hold {
            ttl: Duration::from_secs(60),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ReservationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
