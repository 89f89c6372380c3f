use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Purchase {
    #[serde(rename = "idEvento")]
    pub id_evento: i64,
    pub asientos: Vec<i32>,
    pub nombre: String,
    pub apellido: String,
    pub cedula: String,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: Decimal,
}
