use serde::{Deserialize, Serialize};

pub type SeatId = i64;
pub type HallId = i64;

/// Static identity of a seat within a hall. Immutable once created and
/// read-only to the booking core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub hall_id: HallId,
    pub row: u32,
    pub number: u32,
    /// Row letter plus seat number, e.g. "A1", "C10".
    pub display_name: String,
}

impl Seat {
    pub fn new(id: SeatId, hall_id: HallId, row: u32, number: u32) -> Self {
        let row_letter = (b'A' + ((row - 1) % 26) as u8) as char;
        Self {
            id,
            hall_id,
            row,
            number,
            display_name: format!("{row_letter}{number}"),
        }
    }
}
