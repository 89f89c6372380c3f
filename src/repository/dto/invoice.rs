use super::Ticket;
use bson::oid::ObjectId;
use rust_decimal::Decimal;
use time::OffsetDateTime;

///
/// Immutable money record of one purchase.
/// Totals satisfy subtotal + tax = total at scale 2
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub event_id: i64,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceWithTickets {
    pub invoice: Invoice,
    pub tickets: Vec<Ticket>,
}
