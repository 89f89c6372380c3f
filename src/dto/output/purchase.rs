use crate::repository::InvoiceWithTickets;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

///
/// One historical purchase of a buyer, returned
/// by GET /api/compras/{cedula}
///
#[derive(Debug, Serialize)]
pub struct Purchase {
    #[serde(rename = "facturaId")]
    pub factura_id: String,
    #[serde(rename = "idEvento")]
    pub id_evento: i64,
    pub nombre: String,
    pub apellido: String,
    pub cedula: String,
    pub tickets: Vec<TicketInfo>,
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub total: Decimal,
    #[serde(rename = "fechaCompra", with = "time::serde::rfc3339")]
    pub fecha_compra: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct TicketInfo {
    #[serde(rename = "ticketId")]
    pub ticket_id: String,
    #[serde(rename = "numeroAsiento")]
    pub numero_asiento: i32,
    #[serde(rename = "precioUnitario")]
    pub precio_unitario: Decimal,
}

impl From<InvoiceWithTickets> for Purchase {
    fn from(invoice_with_tickets: InvoiceWithTickets) -> Self {
        let InvoiceWithTickets { invoice, tickets } = invoice_with_tickets;

        Self {
            factura_id: invoice.id.to_hex(),
            id_evento: invoice.event_id,
            nombre: invoice.first_name,
            apellido: invoice.last_name,
            cedula: invoice.national_id,
            tickets: tickets
                .into_iter()
                .map(|ticket| TicketInfo {
                    ticket_id: ticket.id.to_hex(),
                    numero_asiento: ticket.seat_number,
                    precio_unitario: ticket.unit_price,
                })
                .collect(),
            subtotal: invoice.subtotal,
            iva: invoice.tax,
            total: invoice.total,
            fecha_compra: invoice.created_at,
        }
    }
}
