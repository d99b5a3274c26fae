//! Expiry reclaim, the available-seats view, and ticket lifecycle scenarios.

mod common;

use anyhow::Result;
use booking_core::config::BookingConfig;
use booking_core::state_machine::ReservationState;
use booking_core::store::ReservationStore;
use chrono::Utc;
use common::{env_default, env_with_screening, screening, SCREENING_ID};
use std::time::Duration;

fn short_ttl_config(ttl_ms: u64) -> BookingConfig {
    let mut config = BookingConfig::default();
    config.hold_ttl = Duration::from_millis(ttl_ms);
    config
}

#[tokio::test]
async fn lapsed_hold_is_rebookable_after_sweep() -> Result<()> {
    let env = env_with_screening(1, short_ttl_config(40)).await;
    let seat = env.seat_ids[0];

    let first = env.orchestrator.reserve_seats(SCREENING_ID, vec![seat], 1).await;
    assert!(first.success);

    // no confirmation arrives before the ttl lapses
    tokio::time::sleep(Duration::from_millis(80)).await;
    let reclaimed = env
        .orchestrator
        .sweeper()
        .sweep_screening(SCREENING_ID, Utc::now())
        .await?;
    assert_eq!(reclaimed, 1);

    // a different caller can now take the seat
    let second = env.orchestrator.reserve_seats(SCREENING_ID, vec![seat], 2).await;
    assert!(second.success, "{}", second.message);
    Ok(())
}

#[tokio::test]
async fn live_hold_survives_sweep() -> Result<()> {
    let env = env_default(1).await;
    let seat = env.seat_ids[0];

    let result = env.orchestrator.reserve_seats(SCREENING_ID, vec![seat], 1).await;
    assert!(result.success);

    let reclaimed = env
        .orchestrator
        .sweeper()
        .sweep_screening(SCREENING_ID, Utc::now())
        .await?;
    assert_eq!(reclaimed, 0);

    let rows = env.reservations.list_by_screening(SCREENING_ID).await?;
    assert_eq!(rows[0].state, ReservationState::Held);
    Ok(())
}

#[tokio::test]
async fn available_seats_view_sweeps_lazily() -> Result<()> {
    let env = env_with_screening(4, short_ttl_config(40)).await;
    let seats = env.seat_ids.clone();

    let result = env
        .orchestrator
        .reserve_seats(SCREENING_ID, seats[..2].to_vec(), 1)
        .await;
    assert!(result.success);

    let available = env.orchestrator.list_available_seats(SCREENING_ID).await?;
    assert_eq!(available.len(), 2, "held seats are out of inventory");

    tokio::time::sleep(Duration::from_millis(80)).await;
    let available = env.orchestrator.list_available_seats(SCREENING_ID).await?;
    assert_eq!(available.len(), 4, "lapsed holds come back lazily");
    Ok(())
}

#[tokio::test]
async fn periodic_sweeper_reclaims_in_background() -> Result<()> {
    let env = env_with_screening(1, short_ttl_config(30)).await;
    let seat = env.seat_ids[0];

    let result = env.orchestrator.reserve_seats(SCREENING_ID, vec![seat], 1).await;
    assert!(result.success);

    let handle = env.orchestrator.sweeper().start(Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop().await;

    let rows = env.reservations.list_by_screening(SCREENING_ID).await?;
    assert_eq!(rows[0].state, ReservationState::Available);
    Ok(())
}

#[tokio::test]
async fn confirmed_seats_are_immune_to_sweeping() -> Result<()> {
    let env = env_with_screening(1, short_ttl_config(30)).await;
    let seat = env.seat_ids[0];

    let reserved = env.orchestrator.reserve_seats(SCREENING_ID, vec![seat], 1).await;
    assert!(reserved.success);
    let booked = env.orchestrator.confirm_booking(SCREENING_ID, vec![seat], 1).await;
    assert!(booked.success);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let reclaimed = env
        .orchestrator
        .sweeper()
        .sweep_screening(SCREENING_ID, Utc::now())
        .await?;
    assert_eq!(reclaimed, 0);

    let rows = env.reservations.list_by_screening(SCREENING_ID).await?;
    assert_eq!(rows[0].state, ReservationState::Confirmed);
    Ok(())
}

#[tokio::test]
async fn cancel_ticket_checks_ownership_and_repeats() {
    let env = env_default(1).await;
    let seat = env.seat_ids[0];

    env.orchestrator.reserve_seats(SCREENING_ID, vec![seat], 5).await;
    let booked = env.orchestrator.confirm_booking(SCREENING_ID, vec![seat], 5).await;
    let ticket = booked.tickets[0].clone();

    let wrong_user = env.orchestrator.cancel_ticket(ticket.id, 6).await;
    assert!(!wrong_user.success);
    assert_eq!(wrong_user.message, "Ticket does not belong to this user.");

    let canceled = env.orchestrator.cancel_ticket(ticket.id, 5).await;
    assert!(canceled.success);

    let again = env.orchestrator.cancel_ticket(ticket.id, 5).await;
    assert!(!again.success);
    assert_eq!(again.message, "Ticket is already canceled.");
}

#[tokio::test]
async fn ticket_queries_split_active_and_upcoming() -> Result<()> {
    let env = env_default(2).await;
    let seats = env.seat_ids.clone();

    // a second screening that already started
    let started = screening(2, 1, -1);
    let rows = env.provisioner.initialize_screening(&started).await?;
    let started_seat = rows[0].seat_id;

    env.orchestrator.reserve_seats(SCREENING_ID, seats.clone(), 8).await;
    let upcoming_booking = env
        .orchestrator
        .confirm_booking(SCREENING_ID, seats.clone(), 8)
        .await;
    assert!(upcoming_booking.success);

    env.orchestrator.reserve_seats(2, vec![started_seat], 8).await;
    let started_booking = env
        .orchestrator
        .confirm_booking(2, vec![started_seat], 8)
        .await;
    assert!(started_booking.success);

    let active = env.orchestrator.active_tickets(8).await?;
    assert_eq!(active.len(), 3);

    let upcoming = env.orchestrator.upcoming_tickets(8, Utc::now()).await?;
    assert_eq!(upcoming.len(), 2);
    assert!(upcoming.iter().all(|t| t.screening_id == SCREENING_ID));
    Ok(())
}
