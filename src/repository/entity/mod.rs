mod event_entity;
mod invoice_entity;
mod seat_entity;
mod ticket_entity;

pub use event_entity::*;
pub use invoice_entity::*;
pub use seat_entity::*;
pub use ticket_entity::*;
