use crate::models::screening::ScreeningId;
use crate::models::seat::SeatId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type UserId = i64;

/// Ticket lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Ticket is valid for entry
    Active,
    /// Ticket was redeemed at the door
    Used,
    /// Ticket was canceled and its seat returned to inventory
    Canceled,
}

impl TicketStatus {
    /// Check if this status still counts against a screening's inventory
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active | Self::Used)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Used => write!(f, "used"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "used" => Ok(Self::Used),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("Invalid ticket status: {s}")),
        }
    }
}

/// Durable proof that a seat reservation reached CONFIRMED.
///
/// Created only by a successful confirm phase; canceling a ticket
/// transactionally returns its reservation to AVAILABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: UserId,
    pub screening_id: ScreeningId,
    pub seat_id: SeatId,
    pub purchase_time: DateTime<Utc>,
    pub status: TicketStatus,
}

impl Ticket {
    pub fn issue(
        user_id: UserId,
        screening_id: ScreeningId,
        seat_id: SeatId,
        purchase_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            screening_id,
            seat_id,
            purchase_time,
            status: TicketStatus::Active,
        }
    }
}
