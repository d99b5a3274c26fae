use crate::error::{BookingError, Result};
use std::time::Duration;

/// Tunables for the booking core.
///
/// Defaults are calibrated for a single process fronting one reservation
/// store; every suspension point in a booking workflow (admission, per-seat
/// lock, end-to-end deadline) is bounded by one of these values.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Maximum booking workflows in flight at once. Defaults to 4x the
    /// available parallelism.
    pub admission_capacity: usize,
    /// How long a workflow waits for an admission token before failing fast.
    pub admission_timeout: Duration,
    /// How long a workflow waits for a single seat lock.
    pub lock_timeout: Duration,
    /// Number of partitions in the seat lock table.
    pub lock_partitions: usize,
    /// How long a held seat stays out of inventory without confirmation.
    pub hold_ttl: Duration,
    /// End-to-end deadline for one reserve or confirm call.
    pub workflow_timeout: Duration,
    /// Cadence of the periodic expiry sweep.
    pub sweep_interval: Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4);

        Self {
            admission_capacity: parallelism * 4,
            admission_timeout: Duration::from_secs(5),
            lock_timeout: Duration::from_secs(5),
            lock_partitions: 1024,
            hold_ttl: Duration::from_secs(15 * 60),
            workflow_timeout: Duration::from_secs(15),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl BookingConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("BOOKING_ADMISSION_CAPACITY") {
            config.admission_capacity = capacity.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid admission_capacity: {e}"))
            })?;
        }

        if let Ok(ms) = std::env::var("BOOKING_ADMISSION_TIMEOUT_MS") {
            config.admission_timeout = Duration::from_millis(ms.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid admission_timeout_ms: {e}"))
            })?);
        }

        if let Ok(ms) = std::env::var("BOOKING_LOCK_TIMEOUT_MS") {
            config.lock_timeout = Duration::from_millis(ms.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid lock_timeout_ms: {e}"))
            })?);
        }

        if let Ok(partitions) = std::env::var("BOOKING_LOCK_PARTITIONS") {
            config.lock_partitions = partitions.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid lock_partitions: {e}"))
            })?;
            if config.lock_partitions == 0 {
                return Err(BookingError::Configuration(
                    "lock_partitions must be at least 1".to_string(),
                ));
            }
        }

        if let Ok(secs) = std::env::var("BOOKING_HOLD_TTL_SECS") {
            config.hold_ttl = Duration::from_secs(secs.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid hold_ttl_secs: {e}"))
            })?);
        }

        if let Ok(ms) = std::env::var("BOOKING_WORKFLOW_TIMEOUT_MS") {
            config.workflow_timeout = Duration::from_millis(ms.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid workflow_timeout_ms: {e}"))
            })?);
        }

        if let Ok(secs) = std::env::var("BOOKING_SWEEP_INTERVAL_SECS") {
            config.sweep_interval = Duration::from_secs(secs.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid sweep_interval_secs: {e}"))
            })?);
        }

        Ok(config)
    }
}
