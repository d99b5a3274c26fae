#![allow(dead_code)]

//! Shared fixtures for the booking integration tests.

use booking_core::config::BookingConfig;
use booking_core::models::{Screening, ScreeningId, SeatId};
use booking_core::orchestration::BookingOrchestrator;
use booking_core::store::{
    InMemoryReservationStore, InMemorySeatCatalog, InMemoryScreeningCatalog, InMemoryTicketStore,
    ScreeningProvisioner,
};
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;

pub const SCREENING_ID: ScreeningId = 1;

pub struct TestEnv {
    pub orchestrator: BookingOrchestrator,
    pub screenings: Arc<InMemoryScreeningCatalog>,
    pub reservations: Arc<InMemoryReservationStore>,
    pub tickets: Arc<InMemoryTicketStore>,
    pub provisioner: ScreeningProvisioner,
    pub seat_ids: Vec<SeatId>,
}

pub fn screening(id: ScreeningId, total_seats: u32, start_in_hours: i64) -> Screening {
    let start_time = Utc::now() + ChronoDuration::hours(start_in_hours);
    Screening {
        id,
        hall_id: 1,
        start_time,
        end_time: start_time + ChronoDuration::hours(2),
        price: 12.5,
        total_seats,
    }
}

/// One provisioned screening with `total_seats` seats, everything in-memory.
pub async fn env_with_screening(total_seats: u32, config: BookingConfig) -> TestEnv {
    let screenings = Arc::new(InMemoryScreeningCatalog::new());
    let seats = Arc::new(InMemorySeatCatalog::new());
    let reservations = Arc::new(InMemoryReservationStore::new());
    let tickets = Arc::new(InMemoryTicketStore::new());

    let provisioner = ScreeningProvisioner::new(
        screenings.clone(),
        seats.clone(),
        reservations.clone(),
        tickets.clone(),
    );
    let rows = provisioner
        .initialize_screening(&screening(SCREENING_ID, total_seats, 24))
        .await
        .expect("provisioning fixture screening");
    let seat_ids = rows.iter().map(|row| row.seat_id).collect();

    let orchestrator = BookingOrchestrator::new(
        config,
        screenings.clone(),
        reservations.clone(),
        tickets.clone(),
    );

    TestEnv {
        orchestrator,
        screenings,
        reservations,
        tickets,
        provisioner,
        seat_ids,
    }
}

pub async fn env_default(total_seats: u32) -> TestEnv {
    env_with_screening(total_seats, BookingConfig::default()).await
}
