//! # Admission Controller
//!
//! A counting gate that bounds how many booking workflows execute
//! concurrently, protecting the reservation store and the worker pool from
//! overload. Workflows that cannot obtain a token within their timeout fail
//! fast with an overloaded result instead of queuing unboundedly.
//!
//! The controller is an explicit injected component with a lifecycle:
//! created at process start, closed and drained at shutdown. The token is a
//! RAII permit, so it is returned exactly once on every exit path of the
//! workflow - success, failure, or panic unwind.

use crate::error::{BookingError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

/// Counting gate over the booking worker pool.
#[derive(Debug)]
pub struct AdmissionController {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

/// Token held by an admitted workflow. Returned on drop.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Point-in-time counters for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionMetrics {
    pub capacity: usize,
    pub in_flight: usize,
    pub total_admitted: u64,
    pub total_rejected: u64,
}

impl AdmissionController {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        info!(capacity, "🛡️ Admission controller initialized");
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Try to admit a workflow, waiting up to `timeout` for a token.
    ///
    /// Returns [`BookingError::AdmissionRejected`] when saturated past the
    /// timeout and [`BookingError::Interrupted`] once the gate has been
    /// closed for shutdown.
    pub async fn try_admit(&self, timeout: Duration) -> Result<AdmissionPermit> {
        match tokio::time::timeout(timeout, Arc::clone(&self.semaphore).acquire_owned()).await {
            Ok(Ok(permit)) => {
                self.admitted.fetch_add(1, Ordering::AcqRel);
                self.in_flight.fetch_add(1, Ordering::AcqRel);
                debug!(in_flight = self.in_flight(), "Workflow admitted");
                Ok(AdmissionPermit {
                    _permit: permit,
                    in_flight: Arc::clone(&self.in_flight),
                })
            }
            Ok(Err(_closed)) => {
                warn!("Admission attempted after shutdown");
                Err(BookingError::Interrupted)
            }
            Err(_elapsed) => {
                self.rejected.fetch_add(1, Ordering::AcqRel);
                warn!(
                    capacity = self.capacity,
                    timeout_ms = timeout.as_millis() as u64,
                    "🛡️ Admission rejected, gate saturated"
                );
                Err(BookingError::AdmissionRejected)
            }
        }
    }

    /// Stop admitting new workflows. In-flight workflows keep their tokens.
    pub fn close(&self) {
        info!("🛡️ Admission gate closed");
        self.semaphore.close();
    }

    /// Wait up to `timeout` for every in-flight workflow to finish.
    /// Returns `true` once drained, `false` if the deadline elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight() > 0 {
            if Instant::now() >= deadline {
                warn!(in_flight = self.in_flight(), "Drain deadline elapsed");
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }

    pub fn metrics(&self) -> AdmissionMetrics {
        AdmissionMetrics {
            capacity: self.capacity,
            in_flight: self.in_flight(),
            total_admitted: self.admitted.load(Ordering::Acquire),
            total_rejected: self.rejected.load(Ordering::Acquire),
        }
    }
}
