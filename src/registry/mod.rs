//! Process-wide registries shared by every booking workflow.

pub mod seat_locks;

pub use seat_locks::{SeatLockGuard, SeatLockRegistry};
