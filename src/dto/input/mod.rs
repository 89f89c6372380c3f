mod hold_seats;
mod metrics_range;
mod purchase;

pub use hold_seats::*;
pub use metrics_range::*;
pub use purchase::*;
