use crate::repository::Event;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct EventEntity {
    #[serde(rename = "_id")]
    pub event_id: i64,
    pub capacity: i32,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            event_id: entity.event_id,
            capacity: entity.capacity,
        }
    }
}
