pub mod catalog_consumer_service;
pub mod hold_cleanup_service;
pub mod notifications_producer_service;
pub mod seat_updates_service;
pub mod tickets_service;
