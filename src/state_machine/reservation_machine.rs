//! # Reservation State Machine
//!
//! The per-seat lifecycle: `AVAILABLE -> HELD -> CONFIRMED`, with expiry and
//! cancellation transitions back to AVAILABLE.
//!
//! [`determine_transition`] is the pure rule table; [`ReservationLifecycle`]
//! applies it against the reservation store, bumping the optimistic version
//! on every persisted transition.
//!
//! Every lifecycle call requires the caller to hold the seat's lock from the
//! [`crate::registry::SeatLockRegistry`]. That is what serializes racing
//! workflows on one seat - including confirm racing the expiry sweeper:
//! whichever acquires the lock first wins, the loser fails cleanly.

use crate::error::{BookingError, Result};
use crate::models::{ScreeningId, SeatId, SeatKey, SeatReservation};
use crate::state_machine::errors::TransitionError;
use crate::state_machine::events::ReservationEvent;
use crate::state_machine::states::ReservationState;
use crate::store::ReservationStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Outcome of evaluating an event against the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Move to `state` with the given hold expiry
    Apply {
        state: ReservationState,
        hold_expiry: Option<DateTime<Utc>>,
    },
    /// Event does not apply in this state and is defined as a no-op
    Noop,
}

fn lapsed(hold_expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    hold_expiry.map_or(true, |expiry| expiry <= now)
}

/// Pure transition rules for one reservation.
///
/// Violations come back as [`TransitionError`]; only `ExpireIfStale` has a
/// defined no-op outcome. `Confirm` deliberately does not re-check the hold
/// expiry: a caller that reaches confirm while still holding the seat's lock
/// beats the sweeper by construction.
pub fn determine_transition(
    current: ReservationState,
    hold_expiry: Option<DateTime<Utc>>,
    event: &ReservationEvent,
    now: DateTime<Utc>,
) -> std::result::Result<Transition, TransitionError> {
    use ReservationEvent as Event;
    use ReservationState as State;

    let transition = match (current, event) {
        // Hold transitions: from AVAILABLE, or from a lapsed HELD
        (State::Available, Event::Hold { ttl }) => Transition::Apply {
            state: State::Held,
            hold_expiry: Some(now + chrono::Duration::milliseconds(ttl.as_millis() as i64)),
        },
        (State::Held, Event::Hold { ttl }) if lapsed(hold_expiry, now) => Transition::Apply {
            state: State::Held,
            hold_expiry: Some(now + chrono::Duration::milliseconds(ttl.as_millis() as i64)),
        },
        (State::Held, Event::Hold { .. }) => return Err(TransitionError::AlreadyHeld),
        (State::Confirmed, Event::Hold { .. }) => return Err(TransitionError::AlreadyConfirmed),

        // Confirm transitions
        (State::Held, Event::Confirm) => Transition::Apply {
            state: State::Confirmed,
            hold_expiry: None,
        },
        (State::Available, Event::Confirm) => return Err(TransitionError::NotHeld),
        (State::Confirmed, Event::Confirm) => return Err(TransitionError::AlreadyConfirmed),

        // Release transitions
        (State::Held, Event::Release) => Transition::Apply {
            state: State::Available,
            hold_expiry: None,
        },
        (State::Confirmed, Event::Release) => return Err(TransitionError::Immutable),
        (State::Available, Event::Release) => return Err(TransitionError::NotHeld),

        // Expiry reclaim: no-op unless HELD with a lapsed hold
        (State::Held, Event::ExpireIfStale) if lapsed(hold_expiry, now) => Transition::Apply {
            state: State::Available,
            hold_expiry: None,
        },
        (_, Event::ExpireIfStale) => Transition::Noop,

        // Cancellation of a sold seat
        (State::Confirmed, Event::Cancel) => Transition::Apply {
            state: State::Available,
            hold_expiry: None,
        },
        (State::Available | State::Held, Event::Cancel) => return Err(TransitionError::NotHeld),
    };

    Ok(transition)
}

/// Store-backed reservation lifecycle.
///
/// Loads the row, evaluates the pure transition, and persists with a version
/// bump. The store's optimistic versioning is the arbiter of last resort; in
/// a correct deployment the seat lock already serialized us.
#[derive(Clone)]
pub struct ReservationLifecycle {
    store: Arc<dyn ReservationStore>,
}

impl ReservationLifecycle {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    async fn load(&self, screening_id: ScreeningId, seat_id: SeatId) -> Result<SeatReservation> {
        self.store
            .get(screening_id, seat_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!(
                    "reservation {}",
                    SeatKey::new(screening_id, seat_id)
                ))
            })
    }

    /// Evaluate and persist one event. Returns the row and whether it changed.
    async fn apply(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
        event: ReservationEvent,
        now: DateTime<Utc>,
    ) -> Result<(SeatReservation, bool)> {
        let reservation = self.load(screening_id, seat_id).await?;

        match determine_transition(reservation.state, reservation.hold_expiry, &event, now)? {
            Transition::Noop => Ok((reservation, false)),
            Transition::Apply { state, hold_expiry } => {
                let mut updated = reservation;
                updated.state = state;
                updated.hold_expiry = hold_expiry;
                let saved = self.store.save(updated).await?;
                debug!(
                    key = %saved.key(),
                    event = event.event_type(),
                    state = %saved.state,
                    version = saved.version,
                    "🎟️ Reservation transition applied"
                );
                Ok((saved, true))
            }
        }
    }

    /// `AVAILABLE -> HELD` (or re-hold of a lapsed HELD) with `expiry = now + ttl`.
    pub async fn hold(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
        ttl: Duration,
    ) -> Result<SeatReservation> {
        let (reservation, _) = self
            .apply(screening_id, seat_id, ReservationEvent::Hold { ttl }, Utc::now())
            .await?;
        Ok(reservation)
    }

    /// `HELD -> CONFIRMED`.
    pub async fn confirm(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
    ) -> Result<SeatReservation> {
        let (reservation, _) = self
            .apply(screening_id, seat_id, ReservationEvent::Confirm, Utc::now())
            .await?;
        Ok(reservation)
    }

    /// `HELD -> AVAILABLE`; `Immutable` on a confirmed seat.
    pub async fn release(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
    ) -> Result<SeatReservation> {
        let (reservation, _) = self
            .apply(screening_id, seat_id, ReservationEvent::Release, Utc::now())
            .await?;
        Ok(reservation)
    }

    /// Reclaim a lapsed hold. Returns `true` if the seat was returned to
    /// inventory, `false` for the defined no-op.
    pub async fn expire_if_stale(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let (_, changed) = self
            .apply(screening_id, seat_id, ReservationEvent::ExpireIfStale, now)
            .await?;
        Ok(changed)
    }

    /// `CONFIRMED -> AVAILABLE`, used when a ticket is canceled.
    pub async fn cancel(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
    ) -> Result<SeatReservation> {
        let (reservation, _) = self
            .apply(screening_id, seat_id, ReservationEvent::Cancel, Utc::now())
            .await?;
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryReservationStore;
    use proptest::prelude::*;

    const TTL: Duration = Duration::from_secs(900);

    fn hold_event() -> ReservationEvent {
        ReservationEvent::Hold { ttl: TTL }
    }

    #[test]
    fn test_hold_from_available() {
        let now = Utc::now();
        let transition =
            determine_transition(ReservationState::Available, None, &hold_event(), now).unwrap();
        match transition {
            Transition::Apply { state, hold_expiry } => {
                assert_eq!(state, ReservationState::Held);
                assert_eq!(hold_expiry, Some(now + chrono::Duration::minutes(15)));
            }
            Transition::Noop => panic!("hold from available must apply"),
        }
    }

    #[test]
    fn test_hold_reclaims_lapsed_hold() {
        let now = Utc::now();
        let stale = Some(now - chrono::Duration::minutes(1));
        let transition =
            determine_transition(ReservationState::Held, stale, &hold_event(), now).unwrap();
        assert!(matches!(
            transition,
            Transition::Apply {
                state: ReservationState::Held,
                ..
            }
        ));
    }

    #[test]
    fn test_hold_rejected_while_live() {
        let now = Utc::now();
        let live = Some(now + chrono::Duration::minutes(10));
        let err =
            determine_transition(ReservationState::Held, live, &hold_event(), now).unwrap_err();
        assert_eq!(err, TransitionError::AlreadyHeld);

        let err = determine_transition(ReservationState::Confirmed, None, &hold_event(), now)
            .unwrap_err();
        assert_eq!(err, TransitionError::AlreadyConfirmed);
    }

    #[test]
    fn test_confirm_only_from_held() {
        let now = Utc::now();
        let live = Some(now + chrono::Duration::minutes(10));

        let ok = determine_transition(
            ReservationState::Held,
            live,
            &ReservationEvent::Confirm,
            now,
        )
        .unwrap();
        assert!(matches!(
            ok,
            Transition::Apply {
                state: ReservationState::Confirmed,
                hold_expiry: None,
            }
        ));

        let err = determine_transition(
            ReservationState::Available,
            None,
            &ReservationEvent::Confirm,
            now,
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::NotHeld);
    }

    #[test]
    fn test_confirm_does_not_recheck_expiry() {
        // the per-seat lock decides the confirm-vs-sweeper race; a caller
        // that reaches confirm while the row is still HELD wins
        let now = Utc::now();
        let lapsed = Some(now - chrono::Duration::seconds(30));
        let ok = determine_transition(
            ReservationState::Held,
            lapsed,
            &ReservationEvent::Confirm,
            now,
        )
        .unwrap();
        assert!(matches!(
            ok,
            Transition::Apply {
                state: ReservationState::Confirmed,
                ..
            }
        ));
    }

    #[test]
    fn test_release_rules() {
        let now = Utc::now();
        let err = determine_transition(
            ReservationState::Confirmed,
            None,
            &ReservationEvent::Release,
            now,
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::Immutable);

        let err = determine_transition(
            ReservationState::Available,
            None,
            &ReservationEvent::Release,
            now,
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::NotHeld);
    }

    #[test]
    fn test_expire_is_noop_unless_lapsed() {
        let now = Utc::now();
        let live = Some(now + chrono::Duration::minutes(10));
        assert_eq!(
            determine_transition(
                ReservationState::Held,
                live,
                &ReservationEvent::ExpireIfStale,
                now
            )
            .unwrap(),
            Transition::Noop
        );
        assert_eq!(
            determine_transition(
                ReservationState::Confirmed,
                None,
                &ReservationEvent::ExpireIfStale,
                now
            )
            .unwrap(),
            Transition::Noop
        );

        let stale = Some(now - chrono::Duration::seconds(1));
        assert!(matches!(
            determine_transition(
                ReservationState::Held,
                stale,
                &ReservationEvent::ExpireIfStale,
                now
            )
            .unwrap(),
            Transition::Apply {
                state: ReservationState::Available,
                hold_expiry: None,
            }
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_bumps_version_per_transition() {
        let store = Arc::new(InMemoryReservationStore::new());
        store
            .save(SeatReservation::available(1, 7))
            .await
            .unwrap();

        let lifecycle = ReservationLifecycle::new(store.clone());
        let held = lifecycle.hold(1, 7, TTL).await.unwrap();
        assert_eq!(held.state, ReservationState::Held);
        assert_eq!(held.version, 1);

        let confirmed = lifecycle.confirm(1, 7).await.unwrap();
        assert_eq!(confirmed.state, ReservationState::Confirmed);
        assert_eq!(confirmed.version, 2);
        assert_eq!(confirmed.hold_expiry, None);

        let canceled = lifecycle.cancel(1, 7).await.unwrap();
        assert_eq!(canceled.state, ReservationState::Available);
        assert_eq!(canceled.version, 3);
    }

    #[tokio::test]
    async fn test_lifecycle_missing_row_is_not_found() {
        let store = Arc::new(InMemoryReservationStore::new());
        let lifecycle = ReservationLifecycle::new(store);
        let err = lifecycle.hold(1, 99, TTL).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_hold_then_confirm_always_succeeds_uncontended() {
        let store = Arc::new(InMemoryReservationStore::new());
        store
            .save(SeatReservation::available(3, 4))
            .await
            .unwrap();
        let lifecycle = ReservationLifecycle::new(store);
        lifecycle.hold(3, 4, TTL).await.unwrap();
        lifecycle.confirm(3, 4).await.unwrap();
    }

    fn event_strategy() -> impl Strategy<Value = ReservationEvent> {
        prop_oneof![
            (1u64..7200).prop_map(|secs| ReservationEvent::Hold {
                ttl: Duration::from_secs(secs),
            }),
            Just(ReservationEvent::Confirm),
            Just(ReservationEvent::Release),
            Just(ReservationEvent::ExpireIfStale),
            Just(ReservationEvent::Cancel),
        ]
    }

    proptest! {
        /// Property: any event sequence keeps (state, expiry) coherent -
        /// HELD always carries an expiry, nothing else does.
        #[test]
        fn transition_sequences_stay_coherent(
            events in prop::collection::vec(event_strategy(), 0..48),
            step_secs in 1i64..3600,
        ) {
            let mut now = Utc::now();
            let mut state = ReservationState::Available;
            let mut hold_expiry = None;

            for event in &events {
                if let Ok(Transition::Apply { state: next, hold_expiry: expiry }) =
                    determine_transition(state, hold_expiry, event, now)
                {
                    state = next;
                    hold_expiry = expiry;
                }
                now += chrono::Duration::seconds(step_secs);

                match state {
                    ReservationState::Held => prop_assert!(hold_expiry.is_some()),
                    _ => prop_assert!(hold_expiry.is_none()),
                }
            }
        }

        /// Property: a lapsed hold is indistinguishable from AVAILABLE to a
        /// subsequent hold attempt.
        #[test]
        fn lapsed_hold_is_reclaimable(age_secs in 0i64..86_400) {
            let now = Utc::now();
            let expiry = Some(now - chrono::Duration::seconds(age_secs));
            let outcome = determine_transition(
                ReservationState::Held,
                expiry,
                &ReservationEvent::Hold { ttl: Duration::from_secs(900) },
                now,
            );
            let is_held_apply = matches!(
                outcome,
                Ok(Transition::Apply { state: ReservationState::Held, .. })
            );
            prop_assert!(is_held_apply);
        }
    }
}
