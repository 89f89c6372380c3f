use crate::repository::{Seat, SeatStatus};
use serde::Serialize;
use time::OffsetDateTime;

///
/// Realtime delta of one seat, broadcast to subscribers
/// of /ws/eventos/{idEvento}/asientos after commit
///
#[derive(Debug, Clone, Serialize)]
pub struct SeatUpdate {
    #[serde(rename = "idEvento")]
    pub id_evento: i64,
    pub asiento: i32,
    pub estado: SeatStatus,
    #[serde(rename = "holdUntil", with = "time::serde::rfc3339::option")]
    pub hold_until: Option<OffsetDateTime>,
}

impl From<&Seat> for SeatUpdate {
    fn from(seat: &Seat) -> Self {
        Self {
            id_evento: seat.event_id,
            asiento: seat.number,
            estado: seat.status,
            hold_until: seat.hold_until,
        }
    }
}
