//! Structured error handling for the booking core.
//!
//! Errors are layered the same way the components are: the store and the
//! state machine each have their own error type, and [`BookingError`] is the
//! top-level taxonomy the orchestrator works with. Orchestration converts
//! these into failed `BookingResult`s with human-readable messages; they
//! never escape to callers as panics.

use crate::models::SeatKey;
use crate::state_machine::TransitionError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Screening, seat, or ticket does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A reservation state transition was rejected
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The reservation or ticket store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Could not acquire the per-seat lock within the bounded timeout
    #[error("timed out waiting for seat lock {key}")]
    LockTimeout { key: SeatKey },

    /// The admission gate is saturated
    #[error("system overloaded, admission rejected")]
    AdmissionRejected,

    /// The end-to-end workflow deadline elapsed
    #[error("booking workflow exceeded its deadline")]
    WorkflowTimeout,

    /// The workflow was aborted by process shutdown
    #[error("workflow aborted by shutdown")]
    Interrupted,

    /// A ticket operation was attempted by someone other than its owner
    #[error("ticket {ticket_id} does not belong to user {user_id}")]
    NotTicketOwner { ticket_id: uuid::Uuid, user_id: i64 },

    /// The screening still has active tickets and cannot be re-provisioned
    #[error("screening {0} has active tickets")]
    ScreeningInUse(i64),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, BookingError>;
