use super::{dto::Notification, NotificationsProducerService, NotificationsProducerServiceConfig};
use crate::bus::{RabbitmqConnection, RabbitmqQueueProducer};
use axum::async_trait;

const PURCHASE_NOTIFICATION_TYPE: &str = "Compra Boletos";
const CATALOG_NOTIFICATION_TYPE: &str = "TICKETS";

pub struct NotificationsProducerServiceImpl {
    producer: RabbitmqQueueProducer,
}

impl NotificationsProducerServiceImpl {
    pub async fn new(
        config: NotificationsProducerServiceConfig,
        rabbitmq_connection: RabbitmqConnection,
    ) -> anyhow::Result<Self> {
        let producer = RabbitmqQueueProducer::new(rabbitmq_connection, config.queue).await?;

        Ok(Self { producer })
    }

    pub async fn close(self) {
        self.producer.close().await;
    }

    fn send(&self, notification: Notification) {
        match serde_json::to_vec(&notification) {
            Ok(content) => self.producer.send(content),
            Err(err) => tracing::error!(%err, "failed to serialize notification"),
        }
    }
}

#[async_trait]
impl NotificationsProducerService for NotificationsProducerServiceImpl {
    async fn send_purchase(&self, first_name: &str, last_name: &str, event_id: i64) {
        tracing::info!(event_id, "producing purchase notification");

        self.send(Notification {
            mensaje: format!(
                "El usuario {first_name} {last_name} compró boletos del evento {event_id}"
            ),
            tipo: PURCHASE_NOTIFICATION_TYPE.to_string(),
        });
    }

    async fn send_catalog_change(&self, message: String) {
        tracing::info!("producing catalog notification");

        self.send(Notification {
            mensaje: message,
            tipo: CATALOG_NOTIFICATION_TYPE.to_string(),
        });
    }
}
