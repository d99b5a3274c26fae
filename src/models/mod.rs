//! Data model for the booking core.
//!
//! Seats and screenings are immutable catalog identity owned by external
//! management; [`SeatReservation`] is the one mutable entity the core fights
//! over; [`Ticket`] is the durable proof a reservation reached CONFIRMED.

pub mod booking;
pub mod reservation;
pub mod screening;
pub mod seat;
pub mod ticket;

pub use booking::BookingResult;
pub use reservation::{SeatKey, SeatReservation};
pub use screening::{Screening, ScreeningId};
pub use seat::{HallId, Seat, SeatId};
pub use ticket::{Ticket, TicketStatus, UserId};
