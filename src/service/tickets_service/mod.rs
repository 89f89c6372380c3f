mod config;
mod pricing;
mod seat_state_machine;
mod tickets_service;
mod tickets_service_impl;

pub use config::*;
pub use tickets_service::*;
pub use tickets_service_impl::*;
