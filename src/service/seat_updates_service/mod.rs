mod config;
mod seat_updates_service;
mod seat_updates_service_impl;

pub use config::*;
pub use seat_updates_service::*;
pub use seat_updates_service_impl::*;
