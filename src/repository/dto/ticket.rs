use bson::oid::ObjectId;
use rust_decimal::Decimal;
use time::OffsetDateTime;

///
/// Immutable purchase artifact bound to exactly one seat
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: ObjectId,
    pub event_id: i64,
    pub seat_id: ObjectId,
    ///
    /// Denormalized seat number so purchase views don't need
    /// to join seats that may have been deleted with their event
    ///
    pub seat_number: i32,
    pub invoice_id: ObjectId,
    pub purchased_at: OffsetDateTime,
    pub unit_price: Decimal,
}
