use serde::{Deserialize, Serialize};
use std::fmt;

/// Reservation state for one (screening, seat) pair.
///
/// At most one of HELD / CONFIRMED holds at any instant for a given pair;
/// a CONFIRMED reservation corresponds 1:1 with a non-canceled ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    /// Seat is in inventory and can be held
    Available,
    /// Seat carries a provisional, time-limited claim
    Held,
    /// Seat is sold; an active ticket exists for it
    Confirmed,
}

impl ReservationState {
    /// Check if the seat can be offered to a new caller
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Check if the seat carries a provisional claim
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Held)
    }

    /// Check if the seat is sold (only cancellation releases it)
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Held => write!(f, "held"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl std::str::FromStr for ReservationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "held" => Ok(Self::Held),
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(format!("Invalid reservation state: {s}")),
        }
    }
}

impl Default for ReservationState {
    fn default() -> Self {
        Self::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(ReservationState::Available.is_available());
        assert!(ReservationState::Held.is_held());
        assert!(ReservationState::Confirmed.is_confirmed());
        assert!(!ReservationState::Held.is_available());
        assert!(!ReservationState::Confirmed.is_held());
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(ReservationState::Held.to_string(), "held");
        assert_eq!(
            "confirmed".parse::<ReservationState>().unwrap(),
            ReservationState::Confirmed
        );
        assert!("sold_out".parse::<ReservationState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&ReservationState::Available).unwrap();
        assert_eq!(json, "\"available\"");
        let parsed: ReservationState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ReservationState::Available);
    }
}
