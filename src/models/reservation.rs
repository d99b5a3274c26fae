use crate::models::screening::ScreeningId;
use crate::models::seat::SeatId;
use crate::state_machine::ReservationState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key identifying the one reservation row per (screening, seat) pair.
/// Rendered as `{screening_id}-{seat_id}` in logs and lock diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatKey {
    pub screening_id: ScreeningId,
    pub seat_id: SeatId,
}

impl SeatKey {
    pub fn new(screening_id: ScreeningId, seat_id: SeatId) -> Self {
        Self {
            screening_id,
            seat_id,
        }
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.screening_id, self.seat_id)
    }
}

/// The central mutable entity: per-(screening, seat) reservation state.
///
/// Exactly one row exists per (screening, seat) pair for the lifetime of the
/// screening, created by layout provisioning and destroyed with the
/// screening. `version` increments on every persisted transition and is the
/// optimistic-concurrency arbiter of last resort; the lock registry keeps
/// two workflows from racing on the same key in the first place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatReservation {
    pub screening_id: ScreeningId,
    pub seat_id: SeatId,
    pub state: ReservationState,
    pub hold_expiry: Option<DateTime<Utc>>,
    pub version: u64,
}

impl SeatReservation {
    /// A fresh AVAILABLE row, as produced by layout provisioning.
    pub fn available(screening_id: ScreeningId, seat_id: SeatId) -> Self {
        Self {
            screening_id,
            seat_id,
            state: ReservationState::Available,
            hold_expiry: None,
            version: 0,
        }
    }

    pub fn key(&self) -> SeatKey {
        SeatKey::new(self.screening_id, self.seat_id)
    }

    /// Whether a HELD row's hold has lapsed. A HELD row with no recorded
    /// expiry is treated as lapsed so it can always be reclaimed.
    pub fn hold_lapsed(&self, now: DateTime<Utc>) -> bool {
        match self.state {
            ReservationState::Held => self.hold_expiry.map_or(true, |expiry| expiry <= now),
            _ => false,
        }
    }
}
