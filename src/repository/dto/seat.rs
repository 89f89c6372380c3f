use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: ObjectId,
    pub event_id: i64,
    pub number: i32,
    pub status: SeatStatus,
    ///
    /// Set iff status is [SeatStatus::Hold]
    ///
    pub hold_until: Option<OffsetDateTime>,
    pub version: i64,
}

impl Seat {
    ///
    /// Fresh AVAILABLE seat, created during lazy materialization
    ///
    pub fn available(event_id: i64, number: i32) -> Self {
        Self {
            id: ObjectId::new(),
            event_id,
            number,
            status: SeatStatus::Available,
            hold_until: None,
            version: 0,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Hold,
    Purchased,
}
