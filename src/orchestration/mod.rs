//! # Booking Orchestration
//!
//! The components that drive a booking request end to end: the admission
//! gate that bounds concurrent workflows, the saga-shaped orchestrator for
//! the two booking phases, and the sweeper that reclaims abandoned holds.

pub mod admission;
pub mod booking;
pub mod saga;
pub mod sweeper;

pub use admission::{AdmissionController, AdmissionMetrics, AdmissionPermit};
pub use booking::BookingOrchestrator;
pub use saga::{Compensation, CompensationLog};
pub use sweeper::{ExpirySweeper, SweeperHandle};
