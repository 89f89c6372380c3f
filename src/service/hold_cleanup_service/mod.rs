mod config;
mod hold_cleanup_service;

pub use config::*;
pub use hold_cleanup_service::*;
