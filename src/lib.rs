//! # Booking Core
//!
//! Concurrent seat-reservation engine for scheduled screenings.
//!
//! ## Overview
//!
//! The core coordinates concurrent attempts to reserve a finite set of seats
//! so that no two bookings ever claim the same seat, while tolerating
//! abandoned or failed in-progress bookings without holding seats forever.
//! Everything else around it (catalog CRUD, users, payments, rendering) is a
//! simple collaborator behind a trait.
//!
//! ## Architecture
//!
//! Booking is a two-phase, compensable workflow:
//!
//! 1. **Reserve** — seats transition `AVAILABLE -> HELD` under per-seat
//!    locks, all-or-nothing, with a bounded hold TTL.
//! 2. **Confirm** — after external payment succeeds, held seats transition
//!    `HELD -> CONFIRMED` and tickets are issued, again all-or-nothing.
//!
//! Each completed step records a compensating action; the first failure
//! unwinds everything this workflow did. Abandoned holds are reclaimed by
//! the [`orchestration::ExpirySweeper`].
//!
//! ## Module Organization
//!
//! - [`models`] - Seats, screenings, reservations, tickets
//! - [`state_machine`] - Per-seat reservation lifecycle
//! - [`registry`] - Partitioned per-seat lock table
//! - [`orchestration`] - Admission control, booking sagas, expiry sweeping
//! - [`store`] - Collaborator store traits and in-memory implementations
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use booking_core::config::BookingConfig;
//! use booking_core::orchestration::BookingOrchestrator;
//! use booking_core::store::{
//!     InMemoryReservationStore, InMemoryScreeningCatalog, InMemoryTicketStore,
//! };
//!
//! # async fn example() {
//! let config = BookingConfig::default();
//! let orchestrator = BookingOrchestrator::new(
//!     config,
//!     Arc::new(InMemoryScreeningCatalog::new()),
//!     Arc::new(InMemoryReservationStore::new()),
//!     Arc::new(InMemoryTicketStore::new()),
//! );
//!
//! let result = orchestrator.reserve_seats(1, vec![11, 12], 42).await;
//! if result.success {
//!     // payment happens out-of-band, then:
//!     let booked = orchestrator.confirm_booking(1, result.seats.clone(), 42).await;
//!     println!("issued {} tickets", booked.tickets.len());
//! }
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod state_machine;
pub mod store;

pub use config::BookingConfig;
pub use error::{BookingError, Result};
pub use models::{
    BookingResult, Screening, ScreeningId, Seat, SeatId, SeatKey, SeatReservation, Ticket,
    TicketStatus, UserId,
};
pub use orchestration::{
    AdmissionController, AdmissionMetrics, BookingOrchestrator, ExpirySweeper,
};
pub use registry::SeatLockRegistry;
pub use state_machine::{ReservationEvent, ReservationLifecycle, ReservationState};
