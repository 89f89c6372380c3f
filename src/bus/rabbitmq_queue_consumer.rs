use super::RabbitmqConnection;
use amqprs::{
    callbacks::ChannelCallback,
    channel::{
        BasicCancelArguments, BasicConsumeArguments, Channel, QueueDeclareArguments,
    },
    connection::Connection,
    consumer::AsyncConsumer,
    Ack, BasicProperties, Cancel, CloseChannel, Nack, Return,
};
use axum::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

///
/// Consumer of a durable queue. Resubscribes after every reconnect
/// and after the broker cancels the consumer.
///
pub struct RabbitmqQueueConsumer {
    task_handle: JoinHandle<()>,

    close_notify: Arc<Notify>,
}

impl RabbitmqQueueConsumer {
    #[tracing::instrument(name = "RabbitMQ Queue Consumer", skip_all, fields(queue))]
    pub async fn new<Consumer>(
        rabbitmq_connection: RabbitmqConnection,
        queue: impl Into<String>,
        consumer: Consumer,
    ) -> anyhow::Result<Self>
    where
        Consumer: AsyncConsumer + Clone + Send + 'static,
    {
        let queue = queue.into();
        tracing::Span::current().record("queue", queue.as_str());
        tracing::info!("starting consumer");

        let mut connection_rx = rabbitmq_connection.connection();
        let Some(connection) = connection_rx.borrow_and_update().clone() else {
            anyhow::bail!("connection failed before creating consumer");
        };

        tracing::info!("opening channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("registering channel callback");
        let consumer_cancelled = Arc::new(Notify::new());
        let channel_callback = ConsumerChannelCallback {
            consumer_cancelled: Arc::clone(&consumer_cancelled),
        };
        channel.register_callback(channel_callback).await?;

        tracing::info!("declaring queue");
        let queue_declare_args = QueueDeclareArguments::durable_client_named(&queue);
        channel.queue_declare(queue_declare_args.clone()).await?;

        tracing::info!("consuming");
        let basic_consume_args = BasicConsumeArguments::new(&queue, "")
            .auto_ack(false)
            .finish();
        channel
            .basic_consume(consumer.clone(), basic_consume_args.clone())
            .await?;

        let consume_loop = ConsumeLoop {
            retry_interval: rabbitmq_connection.config().retry_interval,
            connection_rx,
            channel,
            queue_declare_args,
            basic_consume_args,
            consumer,
            consumer_cancelled,
        };

        let close_notify = Arc::new(Notify::new());
        let close_notify_clone = Arc::clone(&close_notify);
        let task_handle = tokio::spawn(async move {
            consume_loop.run(close_notify_clone).await;
        });

        tracing::info!("consumer started");

        Ok(Self {
            task_handle,
            close_notify,
        })
    }

    pub async fn close(self) {
        tracing::info!("closing consumer");

        self.close_notify.notify_one();

        // task cannot fail/panic
        self.task_handle.await.unwrap();

        tracing::info!("consumer closed");
    }
}

struct ConsumeLoop<Consumer> {
    retry_interval: Duration,

    connection_rx: watch::Receiver<Option<Connection>>,

    channel: Channel,
    queue_declare_args: QueueDeclareArguments,
    basic_consume_args: BasicConsumeArguments,
    consumer: Consumer,

    consumer_cancelled: Arc<Notify>,
}

impl<Consumer> ConsumeLoop<Consumer>
where
    Consumer: AsyncConsumer + Clone + Send + 'static,
{
    #[tracing::instrument(name = "RabbitMQ Queue Consumer", skip_all)]
    async fn run(mut self, stop: Arc<Notify>) {
        tracing::info!("consume loop started");

        tokio::select! {
            biased;

            _ = stop.notified() => {
                tracing::info!("cancelling consumer");
                let args = BasicCancelArguments::new(&self.basic_consume_args.consumer_tag);
                match self.channel.basic_cancel(args).await {
                    Ok(_) => tracing::info!("consumer cancelled"),
                    Err(err) => tracing::warn!(%err, "cancelling consumer failed"),
                }

                tracing::info!("closing channel");
                match self.channel.clone().close().await {
                    Ok(()) => tracing::info!("channel closed"),
                    Err(err) => tracing::warn!(%err, "closing channel failed"),
                }
            }

            _ = async { loop {
                tokio::select! {
                    biased;

                    _ = self.connection_rx.changed() => {
                        tracing::info!("connection changed");
                        self.restore().await;
                    }
                    _ = self.consumer_cancelled.notified() => {
                        tracing::warn!("consumer got cancelled");
                        self.restore().await;
                    }
                }
            }} => {}
        }

        tracing::info!("consume loop finished");
    }

    async fn restore(&mut self) {
        tracing::info!("closing channel");
        match self.channel.clone().close().await {
            Ok(()) => tracing::info!("channel closed"),
            Err(err) => tracing::warn!(%err, "failed to close channel"),
        }

        loop {
            let connection = self.wait_for_connection().await;

            let restored = tokio::select! {
                biased;

                _ = self.connection_rx.changed() => {
                    tracing::info!("connection changed");
                    false
                }

                result = Self::try_restore(
                    &connection,
                    self.queue_declare_args.clone(),
                    self.basic_consume_args.clone(),
                    self.consumer.clone(),
                    Arc::clone(&self.consumer_cancelled),
                ) => match result {
                    Ok(channel) => {
                        self.channel = channel;
                        true
                    }
                    Err(err) => {
                        tracing::warn!(%err, "failed to restore consumer");
                        tokio::time::sleep(self.retry_interval).await;
                        false
                    }
                }
            };

            if restored {
                tracing::info!("consumer restored");
                return;
            }
        }
    }

    async fn wait_for_connection(&mut self) -> Connection {
        loop {
            if let Some(connection) = self.connection_rx.borrow_and_update().clone() {
                return connection;
            }

            // connection_tx cannot be dropped before dropping the consumer
            self.connection_rx.changed().await.unwrap();
        }
    }

    async fn try_restore(
        connection: &Connection,
        queue_declare_args: QueueDeclareArguments,
        basic_consume_args: BasicConsumeArguments,
        consumer: Consumer,
        consumer_cancelled: Arc<Notify>,
    ) -> anyhow::Result<Channel> {
        tracing::info!("recreating channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("recreating channel callback");
        let channel_callback = ConsumerChannelCallback { consumer_cancelled };
        channel.register_callback(channel_callback).await?;

        tracing::info!("recreating queue");
        channel.queue_declare(queue_declare_args).await?;

        tracing::info!("consuming");
        channel.basic_consume(consumer, basic_consume_args).await?;

        Ok(channel)
    }
}

struct ConsumerChannelCallback {
    consumer_cancelled: Arc<Notify>,
}

#[async_trait]
impl ChannelCallback for ConsumerChannelCallback {
    #[tracing::instrument(name = "RabbitMQ Queue Consumer Callback", skip_all)]
    async fn close(
        &mut self,
        _channel: &Channel,
        close: CloseChannel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::error!(
            code = close.reply_code(),
            text = close.reply_text(),
            "received close",
        );

        Ok(())
    }

    #[tracing::instrument(name = "RabbitMQ Queue Consumer Callback", skip_all)]
    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::error!("received cancel");

        self.consumer_cancelled.notify_one();

        Ok(())
    }

    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        // NOP this channel won't be used for publishing
        Ok(active)
    }

    async fn publish_ack(&mut self, _channel: &Channel, _ack: Ack) {
        // NOP this channel won't be used for publishing
    }

    async fn publish_nack(&mut self, _channel: &Channel, _nack: Nack) {
        // NOP this channel won't be used for publishing
    }

    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
    }
}
