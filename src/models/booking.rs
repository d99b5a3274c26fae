use crate::models::seat::SeatId;
use crate::models::ticket::Ticket;
use serde::{Deserialize, Serialize};

/// Transient outcome of a booking operation, returned to callers and never
/// persisted. Partial success is never reported: a result is either fully
/// successful (every requested seat held / confirmed) or fully failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingResult {
    pub success: bool,
    pub message: String,
    /// Seat ids held by a successful reserve phase (no tickets yet).
    pub seats: Vec<SeatId>,
    /// Tickets issued by a successful confirm phase, in seat order.
    pub tickets: Vec<Ticket>,
}

impl BookingResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            seats: Vec::new(),
            tickets: Vec::new(),
        }
    }

    pub fn reserved(message: impl Into<String>, seats: Vec<SeatId>) -> Self {
        Self {
            success: true,
            message: message.into(),
            seats,
            tickets: Vec::new(),
        }
    }

    pub fn booked(message: impl Into<String>, tickets: Vec<Ticket>) -> Self {
        let seats = tickets.iter().map(|t| t.seat_id).collect();
        Self {
            success: true,
            message: message.into(),
            seats,
            tickets,
        }
    }
}
