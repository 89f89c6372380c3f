mod dto;
mod notifications_producer_service;
mod notifications_producer_service_impl;

pub use dto::NotificationsProducerServiceConfig;
pub use notifications_producer_service::*;
pub use notifications_producer_service_impl::*;
