mod invoice;
mod metrics;
mod purchase;
mod seat_update;
mod seat_view;

pub use invoice::*;
pub use metrics::*;
pub use purchase::*;
pub use seat_update::*;
pub use seat_view::*;
