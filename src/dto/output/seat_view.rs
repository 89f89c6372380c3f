use crate::repository::{Seat, SeatStatus};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    #[serde(rename = "asientoId")]
    pub asiento_id: String,
    pub numero: i32,
    pub estado: SeatStatus,
    #[serde(rename = "holdUntil", with = "time::serde::rfc3339::option")]
    pub hold_until: Option<OffsetDateTime>,
}

impl From<Seat> for SeatView {
    fn from(seat: Seat) -> Self {
        Self {
            asiento_id: seat.id.to_hex(),
            numero: seat.number,
            estado: seat.status,
            hold_until: seat.hold_until,
        }
    }
}
