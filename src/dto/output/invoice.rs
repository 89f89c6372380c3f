use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

///
/// Response of POST /api/purchases
///
#[derive(Debug, Serialize)]
pub struct Invoice {
    #[serde(rename = "facturaId")]
    pub factura_id: String,
    #[serde(rename = "idEvento")]
    pub id_evento: i64,
    pub asientos: Vec<i32>,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: Decimal,
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub total: Decimal,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
