use super::invoice_entity::parse_money;
use crate::repository::{Error, Ticket};
use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketEntity {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub event_id: i64,
    pub seat_id: ObjectId,
    pub seat_number: i32,
    pub invoice_id: ObjectId,
    pub purchased_at: DateTime,
    pub unit_price: String,
}

impl From<&Ticket> for TicketEntity {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            event_id: ticket.event_id,
            seat_id: ticket.seat_id,
            seat_number: ticket.seat_number,
            invoice_id: ticket.invoice_id,
            purchased_at: DateTime::from(ticket.purchased_at),
            unit_price: ticket.unit_price.to_string(),
        }
    }
}

impl TryFrom<TicketEntity> for Ticket {
    type Error = Error;

    fn try_from(entity: TicketEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            event_id: entity.event_id,
            seat_id: entity.seat_id,
            seat_number: entity.seat_number,
            invoice_id: entity.invoice_id,
            purchased_at: OffsetDateTime::from(entity.purchased_at),
            unit_price: parse_money(&entity.unit_price)?,
        })
    }
}
