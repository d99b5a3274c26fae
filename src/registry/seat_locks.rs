//! # Seat Lock Registry
//!
//! Per-seat mutual exclusion for reservation state transitions. While a
//! guard is held, no other workflow can observe or mutate the corresponding
//! reservation row.
//!
//! The table is partitioned: a fixed number of async mutexes indexed by the
//! hash of the (screening, seat) key, rather than a lazily-grown map with
//! one lock per key ever seen. Memory stays bounded for the life of the
//! process; two distinct seats hashing to the same partition contend
//! falsely, which is rare at the default partition count and only costs a
//! short wait.

use crate::error::{BookingError, Result};
use crate::models::SeatKey;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

/// Partitioned per-seat lock table.
pub struct SeatLockRegistry {
    partitions: Vec<Arc<Mutex<()>>>,
}

/// Exclusive claim on one seat's partition. Released on drop.
#[derive(Debug)]
pub struct SeatLockGuard {
    key: SeatKey,
    _guard: OwnedMutexGuard<()>,
}

impl SeatLockGuard {
    pub fn key(&self) -> SeatKey {
        self.key
    }
}

impl SeatLockRegistry {
    pub fn new(partition_count: usize) -> Self {
        let partition_count = partition_count.max(1);
        let partitions = (0..partition_count)
            .map(|_| Arc::new(Mutex::new(())))
            .collect();
        Self { partitions }
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    fn partition_for(&self, key: &SeatKey) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.partitions.len()
    }

    /// Acquire the lock for `key`, suspending the workflow (not the thread)
    /// up to `timeout`. On timeout returns [`BookingError::LockTimeout`]
    /// rather than blocking indefinitely.
    pub async fn acquire(&self, key: SeatKey, timeout: Duration) -> Result<SeatLockGuard> {
        let partition = Arc::clone(&self.partitions[self.partition_for(&key)]);

        match tokio::time::timeout(timeout, partition.lock_owned()).await {
            Ok(guard) => {
                debug!(key = %key, "Seat lock acquired");
                Ok(SeatLockGuard { key, _guard: guard })
            }
            Err(_) => {
                warn!(key = %key, timeout_ms = timeout.as_millis() as u64, "Seat lock timed out");
                Err(BookingError::LockTimeout { key })
            }
        }
    }
}

impl std::fmt::Debug for SeatLockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatLockRegistry")
            .field("partitions", &self.partitions.len())
            .finish()
    }
}
