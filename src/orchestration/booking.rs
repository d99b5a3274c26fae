//! # Booking Orchestrator
//!
//! Drives a batch reservation request through admission, per-seat locking,
//! state transitions, and rollback. The two booking phases are exposed as
//! asynchronous, timeout-bounded operations:
//!
//! - **Phase A** [`BookingOrchestrator::reserve_seats`] - all requested
//!   seats transition to HELD or none remain held when the call returns.
//! - **Phase B** [`BookingOrchestrator::confirm_booking`] - invoked after
//!   payment succeeds externally; every held seat becomes CONFIRMED with a
//!   ticket, or every ticket issued by this call is voided.
//!
//! Seats are processed in ascending seat-id order so concurrent workflows
//! acquire locks in the same order. A caller-side timeout on the overall
//! future is terminal for the caller only: the detached workflow still
//! completes, including its own rollback path, and the expiry sweeper is
//! the backstop for anything left HELD.

use crate::config::BookingConfig;
use crate::error::{BookingError, Result};
use crate::models::{
    BookingResult, ScreeningId, SeatId, SeatKey, SeatReservation, Ticket, TicketStatus, UserId,
};
use crate::orchestration::admission::AdmissionController;
use crate::orchestration::saga::{Compensation, CompensationLog};
use crate::orchestration::sweeper::ExpirySweeper;
use crate::registry::SeatLockRegistry;
use crate::state_machine::ReservationLifecycle;
use crate::store::{ReservationStore, ScreeningCatalog, TicketStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const MSG_UNAVAILABLE: &str = "Not all seats available. Please try again.";
const MSG_OVERLOADED: &str = "System overloaded. Please try again later.";
const MSG_SHUTTING_DOWN: &str = "System is shutting down. Please try again later.";
const MSG_TIMEOUT: &str = "Booking timed out. Please try again.";
const MSG_UNEXPECTED: &str = "Booking failed unexpectedly. Please try again.";
const MSG_CONFIRM_FAILED: &str = "Unable to issue tickets. Please try again.";

/// Process-wide booking front door.
///
/// Owns the lock registry, the admission gate, and the expiry sweeper;
/// constructed once at process start and shut down by draining in-flight
/// workflows. Cloning shares all of them.
#[derive(Clone)]
pub struct BookingOrchestrator {
    config: BookingConfig,
    locks: Arc<SeatLockRegistry>,
    admission: Arc<AdmissionController>,
    lifecycle: ReservationLifecycle,
    sweeper: Arc<ExpirySweeper>,
    screenings: Arc<dyn ScreeningCatalog>,
    reservations: Arc<dyn ReservationStore>,
    tickets: Arc<dyn TicketStore>,
}

impl BookingOrchestrator {
    pub fn new(
        config: BookingConfig,
        screenings: Arc<dyn ScreeningCatalog>,
        reservations: Arc<dyn ReservationStore>,
        tickets: Arc<dyn TicketStore>,
    ) -> Self {
        let locks = Arc::new(SeatLockRegistry::new(config.lock_partitions));
        let admission = Arc::new(AdmissionController::new(config.admission_capacity));
        let lifecycle = ReservationLifecycle::new(Arc::clone(&reservations));
        let sweeper = Arc::new(ExpirySweeper::new(
            Arc::clone(&screenings),
            Arc::clone(&reservations),
            lifecycle.clone(),
            Arc::clone(&locks),
            config.lock_timeout,
        ));

        Self {
            config,
            locks,
            admission,
            lifecycle,
            sweeper,
            screenings,
            reservations,
            tickets,
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn sweeper(&self) -> Arc<ExpirySweeper> {
        Arc::clone(&self.sweeper)
    }

    /// Phase A: hold every requested seat, all-or-nothing.
    pub async fn reserve_seats(
        &self,
        screening_id: ScreeningId,
        seat_ids: Vec<SeatId>,
        user_id: UserId,
    ) -> BookingResult {
        let workflow = self.clone();
        let handle = tokio::spawn(async move {
            workflow
                .reserve_workflow(screening_id, seat_ids, user_id)
                .await
        });
        self.await_workflow("reserve_seats", handle).await
    }

    /// Phase B: confirm every held seat into a ticket, all-or-nothing.
    /// Invoked after payment/authorization succeeds externally.
    pub async fn confirm_booking(
        &self,
        screening_id: ScreeningId,
        seat_ids: Vec<SeatId>,
        user_id: UserId,
    ) -> BookingResult {
        let workflow = self.clone();
        let handle = tokio::spawn(async move {
            workflow
                .confirm_workflow(screening_id, seat_ids, user_id)
                .await
        });
        self.await_workflow("confirm_booking", handle).await
    }

    /// Bound a spawned workflow by the end-to-end deadline. On timeout the
    /// caller gets a failure while the detached workflow completes its own
    /// rollback; the sweeper reclaims whatever it leaves HELD.
    async fn await_workflow(
        &self,
        operation: &str,
        handle: JoinHandle<BookingResult>,
    ) -> BookingResult {
        match tokio::time::timeout(self.config.workflow_timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                error!(operation, error = %join_error, "Booking workflow aborted");
                BookingResult::failure(MSG_UNEXPECTED)
            }
            Err(_elapsed) => {
                warn!(
                    operation,
                    timeout_ms = self.config.workflow_timeout.as_millis() as u64,
                    "Workflow deadline elapsed; detached workflow finishes its own cleanup"
                );
                BookingResult::failure(MSG_TIMEOUT)
            }
        }
    }

    /// Ascending order gives every workflow the same lock order; duplicate
    /// requests for one seat would only deadlock against themselves.
    fn normalize_seat_ids(mut seat_ids: Vec<SeatId>) -> Vec<SeatId> {
        seat_ids.sort_unstable();
        seat_ids.dedup();
        seat_ids
    }

    async fn screening_exists(&self, screening_id: ScreeningId) -> std::result::Result<bool, ()> {
        match self.screenings.get_screening(screening_id).await {
            Ok(found) => Ok(found.is_some()),
            Err(e) => {
                error!(screening_id, error = %e, "Screening lookup failed");
                Err(())
            }
        }
    }

    async fn reserve_workflow(
        self,
        screening_id: ScreeningId,
        seat_ids: Vec<SeatId>,
        user_id: UserId,
    ) -> BookingResult {
        let _permit = match self
            .admission
            .try_admit(self.config.admission_timeout)
            .await
        {
            Ok(permit) => permit,
            Err(BookingError::AdmissionRejected) => return BookingResult::failure(MSG_OVERLOADED),
            Err(BookingError::Interrupted) => return BookingResult::failure(MSG_SHUTTING_DOWN),
            Err(e) => {
                error!(screening_id, error = %e, "Admission failed");
                return BookingResult::failure(MSG_UNEXPECTED);
            }
        };

        match self.screening_exists(screening_id).await {
            Ok(true) => {}
            Ok(false) => return BookingResult::failure("Screening not found."),
            Err(()) => return BookingResult::failure(MSG_UNEXPECTED),
        }

        let seat_ids = Self::normalize_seat_ids(seat_ids);
        if seat_ids.is_empty() {
            return BookingResult::failure("No seats requested.");
        }

        let mut log = CompensationLog::new(screening_id);
        for &seat_id in &seat_ids {
            let key = SeatKey::new(screening_id, seat_id);
            let guard = match self.locks.acquire(key, self.config.lock_timeout).await {
                Ok(guard) => guard,
                Err(e) => {
                    debug!(key = %key, user_id, error = %e, "Reserve stopped at lock");
                    self.unwind(log).await;
                    return BookingResult::failure(MSG_UNAVAILABLE);
                }
            };

            match self
                .lifecycle
                .hold(screening_id, seat_id, self.config.hold_ttl)
                .await
            {
                Ok(_) => log.record(Compensation::ReleaseHold { seat_id }),
                Err(e) => {
                    drop(guard);
                    debug!(key = %key, user_id, error = %e, "Reserve stopped at hold");
                    self.unwind(log).await;
                    return BookingResult::failure(MSG_UNAVAILABLE);
                }
            }
            drop(guard);
        }

        info!(
            screening_id,
            user_id,
            seats = seat_ids.len(),
            "🎟️ Seats held"
        );
        BookingResult::reserved("Seats reserved. Complete payment to confirm.", seat_ids)
    }

    async fn confirm_workflow(
        self,
        screening_id: ScreeningId,
        seat_ids: Vec<SeatId>,
        user_id: UserId,
    ) -> BookingResult {
        match self.screening_exists(screening_id).await {
            Ok(true) => {}
            Ok(false) => return BookingResult::failure("Screening not found."),
            Err(()) => return BookingResult::failure(MSG_UNEXPECTED),
        }

        let seat_ids = Self::normalize_seat_ids(seat_ids);
        if seat_ids.is_empty() {
            return BookingResult::failure("No seats requested.");
        }

        let mut log = CompensationLog::new(screening_id);
        let mut issued: Vec<Ticket> = Vec::with_capacity(seat_ids.len());

        for &seat_id in &seat_ids {
            let key = SeatKey::new(screening_id, seat_id);
            let guard = match self.locks.acquire(key, self.config.lock_timeout).await {
                Ok(guard) => guard,
                Err(e) => {
                    debug!(key = %key, user_id, error = %e, "Confirm stopped at lock");
                    self.unwind(log).await;
                    return BookingResult::failure(MSG_CONFIRM_FAILED);
                }
            };

            match self.lifecycle.confirm(screening_id, seat_id).await {
                Ok(_) => {
                    let ticket = Ticket::issue(user_id, screening_id, seat_id, Utc::now());
                    match self.tickets.save(ticket).await {
                        Ok(saved) => {
                            log.record(Compensation::VoidTicket {
                                ticket: saved.clone(),
                            });
                            issued.push(saved);
                            drop(guard);
                        }
                        Err(e) => {
                            // seat is CONFIRMED with no ticket; undo that too
                            log.record(Compensation::ReleaseConfirmed { seat_id });
                            drop(guard);
                            error!(key = %key, user_id, error = %e, "Ticket persistence failed");
                            self.unwind(log).await;
                            return BookingResult::failure(MSG_CONFIRM_FAILED);
                        }
                    }
                }
                Err(e) => {
                    drop(guard);
                    debug!(key = %key, user_id, error = %e, "Confirm stopped at transition");
                    self.unwind(log).await;
                    return BookingResult::failure(MSG_CONFIRM_FAILED);
                }
            }
        }

        info!(
            screening_id,
            user_id,
            tickets = issued.len(),
            "🎫 Booking confirmed"
        );
        BookingResult::booked("Booking confirmed.", issued)
    }

    /// Apply recorded compensations in reverse. Failures here are logged
    /// and never mask the primary failure; a seat we cannot reach stays
    /// HELD for the sweeper or CONFIRMED for manual reconciliation.
    async fn unwind(&self, log: CompensationLog) {
        if log.is_empty() {
            return;
        }
        let screening_id = log.screening_id();
        warn!(
            screening_id,
            steps = log.len(),
            "⏪ Unwinding booking saga"
        );

        for step in log.into_unwind_order() {
            match step {
                Compensation::ReleaseHold { seat_id } => {
                    self.compensate_seat(screening_id, seat_id, false).await;
                }
                Compensation::ReleaseConfirmed { seat_id } => {
                    self.compensate_seat(screening_id, seat_id, true).await;
                }
                Compensation::VoidTicket { ticket } => {
                    if let Err(e) = self
                        .tickets
                        .update_status(ticket.id, TicketStatus::Canceled)
                        .await
                    {
                        error!(ticket_id = %ticket.id, error = %e, "Rollback could not cancel ticket");
                    }
                    self.compensate_seat(screening_id, ticket.seat_id, true)
                        .await;
                }
            }
        }
    }

    async fn compensate_seat(&self, screening_id: ScreeningId, seat_id: SeatId, confirmed: bool) {
        let key = SeatKey::new(screening_id, seat_id);
        let guard = match self.locks.acquire(key, self.config.lock_timeout).await {
            Ok(guard) => guard,
            Err(e) => {
                error!(key = %key, error = %e, "Rollback could not lock seat; sweeper will reclaim");
                return;
            }
        };

        let outcome = if confirmed {
            self.lifecycle.cancel(screening_id, seat_id).await
        } else {
            self.lifecycle.release(screening_id, seat_id).await
        };
        if let Err(e) = outcome {
            error!(key = %key, error = %e, "Rollback transition failed");
        }
        drop(guard);
    }

    /// Cancel an issued ticket: ownership check, CANCELED status, seat back
    /// to AVAILABLE under its lock. Single-seat, single-step; failures
    /// leave state unchanged.
    pub async fn cancel_ticket(&self, ticket_id: Uuid, user_id: UserId) -> BookingResult {
        let ticket = match self.tickets.get(ticket_id).await {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return BookingResult::failure("Ticket not found."),
            Err(e) => {
                error!(ticket_id = %ticket_id, error = %e, "Ticket lookup failed");
                return BookingResult::failure(MSG_UNEXPECTED);
            }
        };

        if ticket.user_id != user_id {
            warn!(ticket_id = %ticket_id, user_id, "Ticket ownership check failed");
            return BookingResult::failure("Ticket does not belong to this user.");
        }
        if ticket.status == TicketStatus::Canceled {
            return BookingResult::failure("Ticket is already canceled.");
        }

        let key = SeatKey::new(ticket.screening_id, ticket.seat_id);
        let guard = match self.locks.acquire(key, self.config.lock_timeout).await {
            Ok(guard) => guard,
            Err(e) => {
                warn!(key = %key, error = %e, "Cancellation could not lock seat");
                return BookingResult::failure("Could not cancel ticket. Please try again.");
            }
        };

        if let Err(e) = self
            .lifecycle
            .cancel(ticket.screening_id, ticket.seat_id)
            .await
        {
            drop(guard);
            warn!(key = %key, error = %e, "Cancellation rejected");
            return BookingResult::failure("Could not cancel ticket. Please try again.");
        }

        let result = match self
            .tickets
            .update_status(ticket.id, TicketStatus::Canceled)
            .await
        {
            Ok(_) => {
                info!(ticket_id = %ticket_id, key = %key, "🎫 Ticket canceled");
                BookingResult {
                    success: true,
                    message: "Ticket canceled.".to_string(),
                    seats: vec![ticket.seat_id],
                    tickets: Vec::new(),
                }
            }
            Err(e) => {
                // seat already returned to inventory; flag for reconciliation
                error!(ticket_id = %ticket_id, error = %e, "Seat freed but ticket status not persisted");
                BookingResult::failure(MSG_UNEXPECTED)
            }
        };
        drop(guard);
        result
    }

    /// Available seats for a screening, seat-ordered. Sweeps lapsed holds
    /// first so abandoned checkouts come back to inventory lazily.
    pub async fn list_available_seats(
        &self,
        screening_id: ScreeningId,
    ) -> Result<Vec<SeatReservation>> {
        if self.screenings.get_screening(screening_id).await?.is_none() {
            return Err(BookingError::NotFound(format!("screening {screening_id}")));
        }

        self.sweeper.sweep_screening(screening_id, Utc::now()).await?;
        let rows = self.reservations.list_by_screening(screening_id).await?;
        Ok(rows
            .into_iter()
            .filter(|row| row.state.is_available())
            .collect())
    }

    /// Active (non-canceled, unredeemed) tickets for a user, newest first.
    pub async fn active_tickets(&self, user_id: UserId) -> Result<Vec<Ticket>> {
        Ok(self
            .tickets
            .list_by_user(user_id)
            .await?
            .into_iter()
            .filter(|ticket| ticket.status == TicketStatus::Active)
            .collect())
    }

    /// Active tickets whose screening has not started yet, soonest first.
    pub async fn upcoming_tickets(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>> {
        let mut upcoming = Vec::new();
        for ticket in self.active_tickets(user_id).await? {
            if let Some(screening) = self.screenings.get_screening(ticket.screening_id).await? {
                if !screening.has_started(now) {
                    upcoming.push((screening.start_time, ticket));
                }
            }
        }
        upcoming.sort_by_key(|(start_time, _)| *start_time);
        Ok(upcoming.into_iter().map(|(_, ticket)| ticket).collect())
    }

    /// Stop admitting new workflows and wait for in-flight ones to finish.
    /// Returns `true` once drained within `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        info!("Booking orchestrator shutting down");
        self.admission.close();
        let drained = self.admission.drain(timeout).await;
        if !drained {
            warn!("In-flight workflows outlived the shutdown deadline");
        }
        drained
    }
}
