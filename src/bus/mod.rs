mod rabbitmq_connection;
mod rabbitmq_queue_consumer;
mod rabbitmq_queue_producer;
mod retry;

pub use rabbitmq_connection::*;
pub use rabbitmq_queue_consumer::*;
pub use rabbitmq_queue_producer::*;
