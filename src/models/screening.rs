use crate::models::seat::HallId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ScreeningId = i64;

/// A scheduled event with a finite seat inventory. Created by catalog
/// management; referenced, never mutated, by the booking core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screening {
    pub id: ScreeningId,
    pub hall_id: HallId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: f64,
    pub total_seats: u32,
}

impl Screening {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now
    }
}
