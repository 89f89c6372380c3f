mod catalog_consumer_service;
mod dto;

pub use catalog_consumer_service::*;
pub use dto::CatalogConsumerServiceConfig;
