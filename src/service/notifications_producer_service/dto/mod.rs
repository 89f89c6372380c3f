mod config;
mod notification;

pub use config::*;
pub use notification::*;
