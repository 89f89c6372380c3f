use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Metrics {
    #[serde(rename = "totalTickets")]
    pub total_tickets: u64,
    #[serde(rename = "totalFacturas")]
    pub total_facturas: u64,
    #[serde(rename = "totalIngresos")]
    pub total_ingresos: Decimal,
    pub periodo: String,
}
