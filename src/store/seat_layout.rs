//! # Seat Layout Provisioning
//!
//! Builds the seat grid for a screening and (re)creates its full AVAILABLE
//! reservation set. Provisioning runs once per screening creation or edit,
//! before any reserve call; the booking core assumes the rows exist.
//!
//! A screening with active tickets can be neither re-provisioned nor torn
//! down.

use crate::error::{BookingError, Result};
use crate::models::{HallId, Screening, ScreeningId, Seat, SeatReservation};
use crate::store::traits::{ReservationStore, ScreeningCatalog, SeatCatalog, TicketStore};
use std::sync::Arc;
use tracing::{debug, info};

pub const SEATS_PER_ROW: u32 = 10;

/// Lay out `total_seats` as rows of [`SEATS_PER_ROW`], row letters "A"
/// onward. Seat ids are left at 0 for the catalog to assign.
pub fn seat_grid(hall_id: HallId, total_seats: u32) -> Vec<Seat> {
    let mut seats = Vec::with_capacity(total_seats as usize);
    let rows = total_seats.div_ceil(SEATS_PER_ROW);

    for row in 1..=rows {
        let seats_in_row = if row == rows && total_seats % SEATS_PER_ROW != 0 {
            total_seats % SEATS_PER_ROW
        } else {
            SEATS_PER_ROW
        };
        for number in 1..=seats_in_row {
            seats.push(Seat::new(0, hall_id, row, number));
        }
    }

    seats
}

/// Creates and tears down the per-screening reservation rows.
#[derive(Clone)]
pub struct ScreeningProvisioner {
    screenings: Arc<dyn ScreeningCatalog>,
    seats: Arc<dyn SeatCatalog>,
    reservations: Arc<dyn ReservationStore>,
    tickets: Arc<dyn TicketStore>,
}

impl ScreeningProvisioner {
    pub fn new(
        screenings: Arc<dyn ScreeningCatalog>,
        seats: Arc<dyn SeatCatalog>,
        reservations: Arc<dyn ReservationStore>,
        tickets: Arc<dyn TicketStore>,
    ) -> Self {
        Self {
            screenings,
            seats,
            reservations,
            tickets,
        }
    }

    /// Register the screening and create one AVAILABLE reservation row per
    /// seat. Existing rows for the screening are dropped first, so an edit
    /// re-provisions from scratch - which is why active tickets block it.
    pub async fn initialize_screening(&self, screening: &Screening) -> Result<Vec<SeatReservation>> {
        if self.tickets.has_active_for_screening(screening.id).await? {
            return Err(BookingError::ScreeningInUse(screening.id));
        }

        self.reservations
            .delete_all_by_screening(screening.id)
            .await?;
        self.screenings.save_screening(screening.clone()).await?;

        let mut rows = Vec::with_capacity(screening.total_seats as usize);
        for seat in seat_grid(screening.hall_id, screening.total_seats) {
            let stored = self.seats.save_seat(seat).await?;
            let row = self
                .reservations
                .save(SeatReservation::available(screening.id, stored.id))
                .await?;
            debug!(key = %row.key(), seat = %stored.display_name, "Reservation row created");
            rows.push(row);
        }

        info!(
            screening_id = screening.id,
            total_seats = screening.total_seats,
            "🎬 Screening provisioned"
        );
        Ok(rows)
    }

    /// Remove a screening and all of its reservation rows. Refused while
    /// any non-canceled ticket exists.
    pub async fn delete_screening(&self, screening_id: ScreeningId) -> Result<bool> {
        if self.tickets.has_active_for_screening(screening_id).await? {
            return Err(BookingError::ScreeningInUse(screening_id));
        }

        self.reservations
            .delete_all_by_screening(screening_id)
            .await?;
        let removed = self.screenings.delete_screening(screening_id).await?;
        if removed {
            info!(screening_id, "🎬 Screening deleted");
        }
        Ok(removed)
    }
}
