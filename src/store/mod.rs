//! # Collaborator Stores
//!
//! The booking core treats durable state as external collaborators behind
//! traits: a transactional row store for reservations with optimistic
//! versioning, a ticket store, and read-mostly catalogs for screenings and
//! seats. The in-memory implementations here back the test suite and small
//! embedders; a deployment substitutes its own database-backed versions.

pub mod memory;
pub mod seat_layout;
pub mod traits;

pub use memory::{
    InMemoryReservationStore, InMemorySeatCatalog, InMemoryScreeningCatalog, InMemoryTicketStore,
};
pub use seat_layout::{ScreeningProvisioner, SEATS_PER_ROW};
pub use traits::{ReservationStore, ScreeningCatalog, SeatCatalog, TicketStore};

/// Failures surfaced by a store implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Optimistic write lost: someone else persisted a newer version.
    /// The seat lock should have prevented this; the store is the arbiter
    /// of last resort.
    #[error("version conflict for {key}: expected {expected}, found {found}")]
    VersionConflict {
        key: String,
        expected: u64,
        found: u64,
    },

    /// The targeted record does not exist
    #[error("record not found: {0}")]
    NotFound(String),

    /// The backend itself failed
    #[error("storage backend error: {0}")]
    Backend(String),
}
