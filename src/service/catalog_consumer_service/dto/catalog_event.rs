use serde::Deserialize;

///
/// Catalog change consumed from the events queue.
/// Both the Spanish wire names and their snake_case
/// counterparts are accepted
///
#[derive(Debug, Deserialize)]
pub struct CatalogEvent {
    #[serde(rename = "idEvento", alias = "event_id")]
    pub id_evento: i64,
    #[serde(rename = "capacidad", alias = "capacity", default)]
    pub capacidad: Option<i32>,
    #[serde(rename = "operacion", alias = "operation")]
    pub operacion: String,
}
