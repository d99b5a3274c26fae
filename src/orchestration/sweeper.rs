//! # Expiry Sweeper
//!
//! Reclaims HELD reservations whose hold lapsed without confirmation. This
//! is the only mechanism that recovers seats abandoned mid-checkout
//! (browser closed, payment never completed) - reserve's own rollback only
//! covers failures visible within a single call.
//!
//! Runs two ways: lazily, whenever the available-seats view is read for a
//! screening, and periodically from a spawned background task. Each reclaim
//! happens under the seat's lock, so a sweep can never pull a seat out from
//! under an in-flight confirm; whichever takes the lock first wins and the
//! loser is a defined no-op or clean failure.

use crate::error::Result;
use crate::models::ScreeningId;
use crate::registry::SeatLockRegistry;
use crate::state_machine::ReservationLifecycle;
use crate::store::{ReservationStore, ScreeningCatalog};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct ExpirySweeper {
    screenings: Arc<dyn ScreeningCatalog>,
    reservations: Arc<dyn ReservationStore>,
    lifecycle: ReservationLifecycle,
    locks: Arc<SeatLockRegistry>,
    lock_timeout: Duration,
}

/// Handle to the periodic sweep task.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

impl ExpirySweeper {
    pub fn new(
        screenings: Arc<dyn ScreeningCatalog>,
        reservations: Arc<dyn ReservationStore>,
        lifecycle: ReservationLifecycle,
        locks: Arc<SeatLockRegistry>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            screenings,
            reservations,
            lifecycle,
            locks,
            lock_timeout,
        }
    }

    /// Reclaim every lapsed hold for one screening. Returns how many seats
    /// went back to inventory.
    pub async fn sweep_screening(
        &self,
        screening_id: ScreeningId,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let rows = self.reservations.list_by_screening(screening_id).await?;
        let mut reclaimed = 0;

        for row in rows.into_iter().filter(|row| row.hold_lapsed(now)) {
            let key = row.key();
            let guard = match self.locks.acquire(key, self.lock_timeout).await {
                Ok(guard) => guard,
                Err(e) => {
                    warn!(key = %key, error = %e, "Sweep skipped seat, lock busy");
                    continue;
                }
            };

            // re-checked under the lock; a confirm that beat us here makes
            // this a no-op
            match self
                .lifecycle
                .expire_if_stale(row.screening_id, row.seat_id, now)
                .await
            {
                Ok(true) => reclaimed += 1,
                Ok(false) => debug!(key = %key, "Hold no longer stale, skipped"),
                Err(e) => warn!(key = %key, error = %e, "Sweep transition failed"),
            }
            drop(guard);
        }

        if reclaimed > 0 {
            info!(screening_id, reclaimed, "🧹 Reclaimed lapsed holds");
        }
        Ok(reclaimed)
    }

    /// Sweep every screening in the catalog.
    pub async fn sweep_all(&self, now: DateTime<Utc>) -> Result<usize> {
        let screenings = self.screenings.list_screenings().await?;
        let sweeps = screenings
            .iter()
            .map(|screening| self.sweep_screening(screening.id, now));

        let mut total = 0;
        for outcome in futures::future::join_all(sweeps).await {
            match outcome {
                Ok(reclaimed) => total += reclaimed,
                Err(e) => warn!(error = %e, "Sweep failed for screening"),
            }
        }
        Ok(total)
    }

    /// Spawn the periodic sweep loop. The returned handle stops it.
    pub fn start(self: Arc<Self>, interval: Duration) -> SweeperHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let sweeper = self;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = sweeper.sweep_all(Utc::now()).await {
                            warn!(error = %e, "Periodic sweep failed");
                        }
                    }
                }
            }
            debug!("Expiry sweeper stopped");
        });

        SweeperHandle { shutdown, handle }
    }
}
