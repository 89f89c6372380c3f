mod event;
mod invoice;
mod seat;
mod ticket;

pub use event::*;
pub use invoice::*;
pub use seat::*;
pub use ticket::*;
