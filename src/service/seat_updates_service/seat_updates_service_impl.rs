use super::{SeatUpdatesService, SeatUpdatesServiceConfig};
use crate::dto::output::SeatUpdate;
use axum::async_trait;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

pub struct SeatUpdatesServiceImpl {
    channel_capacity: usize,
    channels: RwLock<HashMap<i64, broadcast::Sender<SeatUpdate>>>,
}

impl SeatUpdatesServiceImpl {
    pub fn new(config: SeatUpdatesServiceConfig) -> Self {
        Self {
            channel_capacity: config.channel_capacity,
            channels: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SeatUpdatesService for SeatUpdatesServiceImpl {
    async fn publish(&self, update: SeatUpdate) {
        let event_id = update.id_evento;

        {
            let channels = self.channels.read().await;
            let Some(tx) = channels.get(&event_id) else {
                return;
            };
            if tx.send(update).is_ok() {
                return;
            }
        }

        // last subscriber of the event went away, drop its channel
        let mut channels = self.channels.write().await;
        if let Some(tx) = channels.get(&event_id) {
            if tx.receiver_count() == 0 {
                channels.remove(&event_id);
                tracing::debug!(event_id, "removed seat updates channel without subscribers");
            }
        }
    }

    async fn subscribe(&self, event_id: i64) -> broadcast::Receiver<SeatUpdate> {
        let mut channels = self.channels.write().await;
        channels
            .entry(event_id)
            .or_insert_with(|| broadcast::channel(self.channel_capacity).0)
            .subscribe()
    }
}
