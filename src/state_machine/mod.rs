// State machine module for the per-seat reservation lifecycle.
//
// The transition rules are a pure function over (state, event, now); the
// ReservationLifecycle applies them against the reservation store with an
// optimistic version bump per transition. Callers are required to hold the
// seat's lock for every transition.

pub mod errors;
pub mod events;
pub mod reservation_machine;
pub mod states;

// Re-export main types for convenient access
pub use errors::TransitionError;
pub use events::ReservationEvent;
pub use reservation_machine::{determine_transition, ReservationLifecycle, Transition};
pub use states::ReservationState;
