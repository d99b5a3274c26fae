use crate::models::{
    HallId, Screening, ScreeningId, Seat, SeatId, SeatReservation, Ticket, TicketStatus, UserId,
};
use crate::store::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

/// Durable per-(screening, seat) reservation records with optimistic
/// versioning. `save` of an existing row must fail with
/// [`StoreError::VersionConflict`] unless the caller read the current
/// version; the persisted row comes back with its version bumped.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn get(
        &self,
        screening_id: ScreeningId,
        seat_id: SeatId,
    ) -> Result<Option<SeatReservation>, StoreError>;

    async fn save(&self, reservation: SeatReservation) -> Result<SeatReservation, StoreError>;

    async fn list_by_screening(
        &self,
        screening_id: ScreeningId,
    ) -> Result<Vec<SeatReservation>, StoreError>;

    async fn delete_all_by_screening(&self, screening_id: ScreeningId) -> Result<(), StoreError>;
}

/// Ticket persistence.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn save(&self, ticket: Ticket) -> Result<Ticket, StoreError>;

    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn update_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, StoreError>;

    /// All tickets for a user, newest purchase first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Ticket>, StoreError>;

    /// Whether any non-canceled ticket exists for the screening. Guards
    /// screening re-provisioning and teardown.
    async fn has_active_for_screening(
        &self,
        screening_id: ScreeningId,
    ) -> Result<bool, StoreError>;
}

/// Read-mostly screening catalog. The booking core validates existence and
/// reads seat counts; mutation belongs to catalog management.
#[async_trait]
pub trait ScreeningCatalog: Send + Sync {
    async fn get_screening(&self, id: ScreeningId) -> Result<Option<Screening>, StoreError>;

    async fn list_screenings(&self) -> Result<Vec<Screening>, StoreError>;

    async fn save_screening(&self, screening: Screening) -> Result<Screening, StoreError>;

    /// Returns `true` if the screening existed and was removed.
    async fn delete_screening(&self, id: ScreeningId) -> Result<bool, StoreError>;
}

/// Static seat identity within halls.
#[async_trait]
pub trait SeatCatalog: Send + Sync {
    async fn get_seat(&self, id: SeatId) -> Result<Option<Seat>, StoreError>;

    async fn list_by_hall(&self, hall_id: HallId) -> Result<Vec<Seat>, StoreError>;

    /// Persist a seat. A seat with id 0 is assigned the next free id; the
    /// stored seat is returned.
    async fn save_seat(&self, seat: Seat) -> Result<Seat, StoreError>;
}
