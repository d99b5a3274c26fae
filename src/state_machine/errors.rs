/// Violations of the reservation transition rules.
///
/// These are expected outcomes of racing callers, not faults: the
/// orchestrator converts them into failed booking results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Hold attempted on a seat another caller currently holds
    #[error("seat is already held")]
    AlreadyHeld,

    /// Transition attempted on a sold seat
    #[error("seat is already confirmed")]
    AlreadyConfirmed,

    /// Confirm, release, or cancel attempted without the required claim
    #[error("seat is not held")]
    NotHeld,

    /// Release attempted on a confirmed seat; only ticket cancellation
    /// returns a sold seat to inventory
    #[error("confirmed seats are released only through ticket cancellation")]
    Immutable,
}
