mod catalog_event;
mod config;

pub use catalog_event::*;
pub use config::*;
