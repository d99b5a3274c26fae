//! In-memory reference implementations of the collaborator stores.
//!
//! The reservation map enforces the same optimistic-versioning contract a
//! database row store would, so the concurrency tests exercise the real
//! write path.

use crate::models::{
    HallId, Screening, ScreeningId, Seat, SeatId, SeatKey, SeatReservation, Ticket, TicketStatus,
    UserId,
};
use crate::store::traits::{ReservationStore, ScreeningCatalog, SeatCatalog, TicketStore};
use crate::store::StoreError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

/// Reservation rows keyed by (screening, seat) with optimistic versioning.
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    rows: DashMap<SeatKey, SeatReservation>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn get(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
    ) -> Result<Option<SeatReservation>, StoreError> {
        Ok(self
            .rows
            .get(&SeatKey::new(screening_id, seat_id))
            .map(|row| row.value().clone()))
    }

    async fn save(&self, reservation: SeatReservation) -> Result<SeatReservation, StoreError> {
        match self.rows.entry(reservation.key()) {
            Entry::Vacant(slot) => {
                slot.insert(reservation.clone());
                Ok(reservation)
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                if current.version != reservation.version {
                    return Err(StoreError::VersionConflict {
                        key: reservation.key().to_string(),
                        expected: reservation.version,
                        found: current.version,
                    });
                }
                let mut updated = reservation;
                updated.version += 1;
                slot.insert(updated.clone());
                Ok(updated)
            }
        }
    }

    async fn list_by_screening(
        &self,
        screening_id: ScreeningId,
    ) -> Result<Vec<SeatReservation>, StoreError> {
        let mut rows: Vec<SeatReservation> = self
            .rows
            .iter()
            .filter(|entry| entry.screening_id == screening_id)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.seat_id);
        Ok(rows)
    }

    async fn delete_all_by_screening(&self, screening_id: ScreeningId) -> Result<(), StoreError> {
        self.rows.retain(|key, _| key.screening_id != screening_id);
        Ok(())
    }
}

/// Ticket rows keyed by ticket id.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    rows: RwLock<HashMap<Uuid, Ticket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn save(&self, ticket: Ticket) -> Result<Ticket, StoreError> {
        self.rows.write().insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        Ok(self.rows.read().get(&ticket_id).cloned())
    }

    async fn update_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, StoreError> {
        let mut rows = self.rows.write();
        let ticket = rows
            .get_mut(&ticket_id)
            .ok_or_else(|| StoreError::NotFound(format!("ticket {ticket_id}")))?;
        ticket.status = status;
        Ok(ticket.clone())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets: Vec<Ticket> = self
            .rows
            .read()
            .values()
            .filter(|ticket| ticket.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.purchase_time.cmp(&a.purchase_time));
        Ok(tickets)
    }

    async fn has_active_for_screening(
        &self,
        screening_id: ScreeningId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .rows
            .read()
            .values()
            .any(|ticket| ticket.screening_id == screening_id && ticket.status.is_active()))
    }
}

/// Screening catalog rows keyed by screening id.
#[derive(Debug, Default)]
pub struct InMemoryScreeningCatalog {
    rows: RwLock<HashMap<ScreeningId, Screening>>,
}

impl InMemoryScreeningCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScreeningCatalog for InMemoryScreeningCatalog {
    async fn get_screening(&self, id: ScreeningId) -> Result<Option<Screening>, StoreError> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn list_screenings(&self) -> Result<Vec<Screening>, StoreError> {
        let mut screenings: Vec<Screening> = self.rows.read().values().cloned().collect();
        screenings.sort_by_key(|screening| screening.id);
        Ok(screenings)
    }

    async fn save_screening(&self, screening: Screening) -> Result<Screening, StoreError> {
        self.rows.write().insert(screening.id, screening.clone());
        Ok(screening)
    }

    async fn delete_screening(&self, id: ScreeningId) -> Result<bool, StoreError> {
        Ok(self.rows.write().remove(&id).is_some())
    }
}

/// Seat catalog with sequential id assignment for new seats.
#[derive(Debug)]
pub struct InMemorySeatCatalog {
    rows: RwLock<HashMap<SeatId, Seat>>,
    next_id: AtomicI64,
}

impl Default for InMemorySeatCatalog {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemorySeatCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatCatalog for InMemorySeatCatalog {
    async fn get_seat(&self, id: SeatId) -> Result<Option<Seat>, StoreError> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn list_by_hall(&self, hall_id: HallId) -> Result<Vec<Seat>, StoreError> {
        let mut seats: Vec<Seat> = self
            .rows
            .read()
            .values()
            .filter(|seat| seat.hall_id == hall_id)
            .cloned()
            .collect();
        seats.sort_by_key(|seat| seat.id);
        Ok(seats)
    }

    async fn save_seat(&self, seat: Seat) -> Result<Seat, StoreError> {
        let mut stored = seat;
        if stored.id == 0 {
            stored.id = self.next_id.fetch_add(1, Ordering::AcqRel);
        }
        self.rows.write().insert(stored.id, stored.clone());
        Ok(stored)
    }
}
