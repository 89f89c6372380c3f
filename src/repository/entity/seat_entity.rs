use crate::repository::{Seat, SeatStatus};
use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Serialize, Deserialize)]
pub struct SeatEntity {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub event_id: i64,
    pub number: i32,
    pub status: SeatStatus,
    pub hold_until: Option<DateTime>,
    pub version: i64,
}

impl From<&Seat> for SeatEntity {
    fn from(seat: &Seat) -> Self {
        Self {
            id: seat.id,
            event_id: seat.event_id,
            number: seat.number,
            status: seat.status,
            hold_until: seat.hold_until.map(DateTime::from),
            version: seat.version,
        }
    }
}

impl From<SeatEntity> for Seat {
    fn from(entity: SeatEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            number: entity.number,
            status: entity.status,
            hold_until: entity.hold_until.map(OffsetDateTime::from),
            version: entity.version,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seat_entity_roundtrip() {
        let seat = Seat {
            id: ObjectId::new(),
            event_id: 42,
            number: 7,
            status: SeatStatus::Hold,
            hold_until: Some(
                OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            ),
            version: 3,
        };

        let roundtripped = Seat::from(SeatEntity::from(&seat));

        assert_eq!(roundtripped, seat);
    }

    #[test]
    fn seat_status_stored_as_uppercase_string() {
        let bson = bson::to_bson(&SeatStatus::Available).unwrap();

        assert_eq!(bson, bson::Bson::String("AVAILABLE".to_string()));
        assert_eq!(SeatStatus::Purchased.to_string(), "PURCHASED");
    }
}
