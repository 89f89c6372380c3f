use super::{dto::CatalogEvent, CatalogConsumerServiceConfig};
use crate::{
    bus::{RabbitmqConnection, RabbitmqQueueConsumer},
    repository::{self, InventoryRepository, Seat},
    service::notifications_producer_service::NotificationsProducerService,
};
use amqprs::{
    channel::{BasicAckArguments, BasicNackArguments, Channel},
    consumer::AsyncConsumer,
    BasicProperties, Deliver,
};
use axum::async_trait;
use std::sync::Arc;

///
/// Keeps the local event catalog in sync with changes published
/// by the events system
///
pub struct CatalogConsumerService {
    rabbitmq_consumer: RabbitmqQueueConsumer,
}

impl CatalogConsumerService {
    pub async fn new(
        config: CatalogConsumerServiceConfig,
        rabbitmq_connection: RabbitmqConnection,
        repository: Arc<dyn InventoryRepository>,
        notifications: Arc<dyn NotificationsProducerService>,
    ) -> anyhow::Result<Self> {
        let consumer = Consumer {
            repository,
            notifications,
        };
        let rabbitmq_consumer =
            RabbitmqQueueConsumer::new(rabbitmq_connection, config.queue, consumer).await?;

        Ok(Self { rabbitmq_consumer })
    }

    pub async fn close(self) {
        self.rabbitmq_consumer.close().await;
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Disposition {
    Ack,
    NackRequeue,
}

#[derive(Clone)]
struct Consumer {
    repository: Arc<dyn InventoryRepository>,
    notifications: Arc<dyn NotificationsProducerService>,
}

impl Consumer {
    ///
    /// Malformed messages and unknown operations are dropped after
    /// logging; only storage failures are worth a redelivery
    ///
    async fn process(&self, content: &[u8]) -> Disposition {
        let event = match serde_json::from_slice::<CatalogEvent>(content) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%err, "dropping malformed catalog event");
                return Disposition::Ack;
            }
        };

        // EDITAR is what older catalog producers send instead of ACTUALIZAR
        let result = match event.operacion.as_str() {
            "CREAR" | "ACTUALIZAR" | "EDITAR" => self.upsert(&event).await,
            "ELIMINAR" => self.delete(event.id_evento).await,
            operation => {
                tracing::warn!(operation, "dropping catalog event with unknown operation");
                return Disposition::Ack;
            }
        };

        match result {
            Ok(()) => Disposition::Ack,
            Err(err) => {
                tracing::warn!(%err, "failed to apply catalog event, requeueing");
                Disposition::NackRequeue
            }
        }
    }

    async fn upsert(&self, event: &CatalogEvent) -> Result<(), repository::Error> {
        let Some(capacity) = event.capacidad else {
            tracing::warn!(
                event_id = event.id_evento,
                operation = %event.operacion,
                "dropping catalog event without capacity"
            );
            return Ok(());
        };

        let mut txn = self.repository.begin().await?;

        let existing = txn.find_event(event.id_evento).await?;
        let capacity = match &existing {
            Some(existing) if existing.capacity > capacity => {
                tracing::warn!(
                    event_id = event.id_evento,
                    stored = existing.capacity,
                    incoming = capacity,
                    "ignoring capacity shrink"
                );
                existing.capacity
            }
            _ => capacity,
        };

        tracing::info!(event_id = event.id_evento, capacity, "upserting event");
        txn.upsert_event(event.id_evento, capacity).await?;

        // grow already materialized seating to the new capacity
        let seat_count = txn.count_seats(event.id_evento).await? as i32;
        if seat_count > 0 && seat_count < capacity {
            let seats = ((seat_count + 1)..=capacity)
                .map(|number| Seat::available(event.id_evento, number))
                .collect::<Vec<_>>();
            tracing::info!(
                event_id = event.id_evento,
                added = seats.len(),
                "materializing additional seats"
            );
            txn.insert_seats(&seats).await?;
        }

        txn.commit().await?;

        let message = match existing {
            Some(_) => format!(
                "Evento {} actualizado en el catálogo de boletos",
                event.id_evento
            ),
            None => format!("Evento {} disponible para venta de boletos", event.id_evento),
        };
        self.notifications.send_catalog_change(message).await;

        Ok(())
    }

    async fn delete(&self, event_id: i64) -> Result<(), repository::Error> {
        let mut txn = self.repository.begin().await?;

        let existed = txn.delete_event(event_id).await?;
        let deleted_seats = txn.delete_seats_by_event(event_id).await?;

        txn.commit().await?;

        match existed {
            true => {
                tracing::info!(event_id, deleted_seats, "event deleted");
                self.notifications
                    .send_catalog_change(format!("Evento {event_id} retirado de la venta de boletos"))
                    .await;
            }
            false => tracing::info!(event_id, "event to delete not found"),
        }

        Ok(())
    }
}

#[async_trait]
impl AsyncConsumer for Consumer {
    #[tracing::instrument(
        name = "Catalog Consumer",
        skip_all,
        fields(
            delivery_tag = deliver.delivery_tag(),
        )
    )]
    async fn consume(
        &mut self,
        channel: &Channel,
        deliver: Deliver,
        _basic_properties: BasicProperties,
        content: Vec<u8>,
    ) {
        tracing::info!("processing catalog event");

        match self.process(&content).await {
            Disposition::Ack => {
                tracing::trace!("sending ack");
                let args = BasicAckArguments::new(deliver.delivery_tag(), false);
                if let Err(err) = channel.basic_ack(args).await {
                    tracing::warn!(%err, "failed to ack message");
                }
                tracing::trace!("ack sent");
            }
            Disposition::NackRequeue => {
                tracing::trace!("sending nack");
                let args = BasicNackArguments::new(deliver.delivery_tag(), false, true);
                if let Err(err) = channel.basic_nack(args).await {
                    tracing::warn!(%err, "failed to nack message");
                }
                tracing::trace!("nack sent");
            }
        }

        tracing::info!("catalog event processed");
    }
}
