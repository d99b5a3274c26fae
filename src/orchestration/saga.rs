//! Compensation log for the two-phase booking saga.
//!
//! Reserve-then-confirm is a compensable multi-step workflow, not one
//! atomic transaction, because confirm is gated by an external payment
//! step. Every step a workflow completes records its compensating action
//! here; the first failure unwinds the recorded steps in reverse.

use crate::models::{ScreeningId, SeatId, Ticket};

/// Compensating action for one completed saga step.
#[derive(Debug, Clone)]
pub enum Compensation {
    /// Release a provisionally held seat back to AVAILABLE
    ReleaseHold { seat_id: SeatId },
    /// Return a seat that was confirmed but never got its ticket persisted
    ReleaseConfirmed { seat_id: SeatId },
    /// Cancel an issued ticket and return its seat to AVAILABLE
    VoidTicket { ticket: Ticket },
}

/// Ordered record of the compensations owed by one workflow.
#[derive(Debug)]
pub struct CompensationLog {
    screening_id: ScreeningId,
    steps: Vec<Compensation>,
}

impl CompensationLog {
    pub fn new(screening_id: ScreeningId) -> Self {
        Self {
            screening_id,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    pub fn screening_id(&self) -> ScreeningId {
        self.screening_id
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Steps in reverse completion order, ready to apply.
    pub fn into_unwind_order(self) -> Vec<Compensation> {
        let mut steps = self.steps;
        steps.reverse();
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwind_reverses_completion_order() {
        let mut log = CompensationLog::new(1);
        log.record(Compensation::ReleaseHold { seat_id: 1 });
        log.record(Compensation::ReleaseHold { seat_id: 2 });
        log.record(Compensation::ReleaseHold { seat_id: 3 });

        let seats: Vec<SeatId> = log
            .into_unwind_order()
            .into_iter()
            .map(|step| match step {
                Compensation::ReleaseHold { seat_id } => seat_id,
                _ => panic!("unexpected step"),
            })
            .collect();
        assert_eq!(seats, vec![3, 2, 1]);
    }

    #[test]
    fn test_empty_log() {
        let log = CompensationLog::new(9);
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.into_unwind_order().is_empty());
    }
}
