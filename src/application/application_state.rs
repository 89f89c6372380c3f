use super::ApplicationEnv;
use crate::{
    bus::{RabbitmqConnection, RabbitmqConnectionConfig},
    repository::InventoryRepositoryImpl,
    service::{
        catalog_consumer_service::{CatalogConsumerService, CatalogConsumerServiceConfig},
        hold_cleanup_service::{HoldCleanupService, HoldCleanupServiceConfig},
        notifications_producer_service::{
            NotificationsProducerServiceConfig, NotificationsProducerServiceImpl,
        },
        seat_updates_service::{
            SeatUpdatesService, SeatUpdatesServiceConfig, SeatUpdatesServiceImpl,
        },
        tickets_service::{TicketsService, TicketsServiceConfig, TicketsServiceImpl},
    },
};
use amqprs::connection::OpenConnectionArguments;
use axum::extract::FromRef;
use mongodb::{options::ClientOptions, Client};
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct ApplicationState {
    pub tickets_service: Arc<dyn TicketsService>,
    pub seat_updates_service: Arc<dyn SeatUpdatesService>,
}

pub struct ApplicationStateToClose {
    pub db_client: Client,
    pub rabbitmq_connection: RabbitmqConnection,
    pub notifications_producer_service: Arc<NotificationsProducerServiceImpl>,
    pub catalog_consumer_service: CatalogConsumerService,
    pub hold_cleanup_service: HoldCleanupService,
}

pub async fn create_state(
    env: &ApplicationEnv,
) -> anyhow::Result<(ApplicationState, ApplicationStateToClose)> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let inventory_repository = InventoryRepositoryImpl::new(db_client.clone(), db).await?;
    let inventory_repository = Arc::new(inventory_repository);

    tracing::info!("connecting to rabbitmq");
    let config = RabbitmqConnectionConfig {
        retry_interval: env.rabbitmq_retry_interval,
    };
    let open_connection_args =
        OpenConnectionArguments::try_from(env.rabbitmq_connection_string.as_str())?;
    let rabbitmq_connection = RabbitmqConnection::new(config, open_connection_args).await?;

    tracing::info!("creating services");
    let config = NotificationsProducerServiceConfig {
        queue: env.rabbitmq_notifications_queue_name.clone(),
    };
    let notifications_producer_service =
        NotificationsProducerServiceImpl::new(config, rabbitmq_connection.clone()).await?;
    let notifications_producer_service = Arc::new(notifications_producer_service);

    let config = SeatUpdatesServiceConfig {
        channel_capacity: env.seat_updates_channel_capacity,
    };
    let seat_updates_service = SeatUpdatesServiceImpl::new(config);
    let seat_updates_service = Arc::new(seat_updates_service);

    let config = TicketsServiceConfig {
        hold_window: env.hold_window,
        tax_rate: env.tax_rate,
        conflict_retries: env.conflict_retries,
    };
    let tickets_service = TicketsServiceImpl::new(
        config,
        inventory_repository.clone(),
        seat_updates_service.clone(),
        notifications_producer_service.clone(),
    );
    let tickets_service: Arc<dyn TicketsService> = Arc::new(tickets_service);

    let config = CatalogConsumerServiceConfig {
        queue: env.rabbitmq_events_queue_name.clone(),
    };
    let catalog_consumer_service = CatalogConsumerService::new(
        config,
        rabbitmq_connection.clone(),
        inventory_repository,
        notifications_producer_service.clone(),
    )
    .await?;

    let config = HoldCleanupServiceConfig {
        sweep_interval: env.sweep_interval,
    };
    let hold_cleanup_service = HoldCleanupService::new(config, tickets_service.clone());

    Ok((
        ApplicationState {
            tickets_service,
            seat_updates_service,
        },
        ApplicationStateToClose {
            db_client,
            rabbitmq_connection,
            notifications_producer_service,
            catalog_consumer_service,
            hold_cleanup_service,
        },
    ))
}
