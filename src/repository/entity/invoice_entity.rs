use crate::repository::{Error, Invoice};
use bson::{oid::ObjectId, DateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

///
/// Money amounts are stored as canonical scale-2 strings so the decimal
/// value round-trips exactly
///
#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceEntity {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub event_id: i64,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub created_at: DateTime,
}

impl From<&Invoice> for InvoiceEntity {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id,
            first_name: invoice.first_name.clone(),
            last_name: invoice.last_name.clone(),
            national_id: invoice.national_id.clone(),
            event_id: invoice.event_id,
            subtotal: invoice.subtotal.to_string(),
            tax: invoice.tax.to_string(),
            total: invoice.total.to_string(),
            created_at: DateTime::from(invoice.created_at),
        }
    }
}

impl TryFrom<InvoiceEntity> for Invoice {
    type Error = Error;

    fn try_from(entity: InvoiceEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            national_id: entity.national_id,
            event_id: entity.event_id,
            subtotal: parse_money(&entity.subtotal)?,
            tax: parse_money(&entity.tax)?,
            total: parse_money(&entity.total)?,
            created_at: OffsetDateTime::from(entity.created_at),
        })
    }
}

pub(in crate::repository) fn parse_money(value: &str) -> Result<Decimal, Error> {
    Decimal::from_str(value).map_err(|_| Error::Corrupted("invalid money amount"))
}
