use super::RabbitmqConnection;
use amqprs::{
    channel::{BasicPublishArguments, Channel, QueueDeclareArguments},
    connection::Connection,
    BasicProperties,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch, Notify},
    task::JoinHandle,
};

///
/// Producer publishing persistent messages straight to a durable queue
/// through the default exchange.
///
/// [Self::send] only enqueues; a background task performs the actual
/// publish and keeps unpublished messages across reconnects, so
/// messages survive broker outages but may be delivered more than once.
///
pub struct RabbitmqQueueProducer {
    messages_tx: mpsc::UnboundedSender<Vec<u8>>,

    task_handle: JoinHandle<Channel>,
    close_notify: Arc<Notify>,
}

impl RabbitmqQueueProducer {
    #[tracing::instrument(name = "RabbitMQ Queue Producer", skip_all, fields(queue))]
    pub async fn new(
        rabbitmq_connection: RabbitmqConnection,
        queue: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let queue = queue.into();
        tracing::Span::current().record("queue", queue.as_str());
        tracing::info!("starting producer");

        let mut connection_rx = rabbitmq_connection.connection();
        let Some(connection) = connection_rx.borrow_and_update().clone() else {
            anyhow::bail!("connection failed before creating producer");
        };

        tracing::info!("opening channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("declaring queue");
        let queue_declare_args = QueueDeclareArguments::durable_client_named(&queue);
        channel.queue_declare(queue_declare_args.clone()).await?;

        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        let close_notify = Arc::new(Notify::new());

        let publish_loop = PublishLoop {
            retry_interval: rabbitmq_connection.config().retry_interval,
            connection_rx,
            channel,
            queue,
            queue_declare_args,
            messages_tx: messages_tx.clone(),
            messages_rx,
        };
        let task_handle = tokio::spawn(keep_alive(Arc::clone(&close_notify), publish_loop));

        tracing::info!("producer started");

        Ok(Self {
            messages_tx,
            task_handle,
            close_notify,
        })
    }

    #[tracing::instrument(name = "RabbitMQ Queue Producer", skip_all)]
    pub async fn close(self) {
        tracing::info!("closing producer");

        self.close_notify.notify_one();

        // task cannot fail/panic
        let channel = self.task_handle.await.unwrap();

        tracing::info!("closing channel");
        if let Err(err) = channel.close().await {
            tracing::warn!(%err, "closing channel failed");
        }

        tracing::info!("producer closed");
    }

    pub fn send(&self, content: Vec<u8>) {
        // messages_rx lives in the publish task until close
        self.messages_tx.send(content).unwrap();
    }
}

#[tracing::instrument(name = "RabbitMQ Queue Producer", skip_all)]
async fn keep_alive(close_notify: Arc<Notify>, mut publish_loop: PublishLoop) -> Channel {
    tracing::info!("keep alive started");

    tokio::select! {
        biased;

        _ = close_notify.notified() => {}
        _ = publish_loop.run() => {}
    }

    tracing::info!("keep alive finished");

    publish_loop.channel
}

struct PublishLoop {
    retry_interval: Duration,

    connection_rx: watch::Receiver<Option<Connection>>,

    channel: Channel,
    queue: String,
    queue_declare_args: QueueDeclareArguments,

    messages_tx: mpsc::UnboundedSender<Vec<u8>>,
    messages_rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl PublishLoop {
    async fn run(&mut self) {
        loop {
            tokio::select! {
                biased;

                _ = self.connection_rx.changed() => {
                    tracing::info!("connection changed");
                    self.restore().await;
                }

                result = self.messages_rx.recv() => {
                    // publish loop holds both ends of the channel
                    let content = result.unwrap();

                    let basic_properties = BasicProperties::default().with_persistence(true).finish();
                    let args = BasicPublishArguments::new("", &self.queue);
                    let publish_result = self
                        .channel
                        .basic_publish(basic_properties, content.clone(), args)
                        .await;
                    if let Err(err) = publish_result {
                        tracing::warn!(%err, "basic publish failed");
                        // schedule message for another send after restore
                        self.messages_tx.send(content).unwrap();
                        self.restore().await;
                    }
                }
            }
        }
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

                result = Self::try_restore(&connection, &self.queue_declare_args) => match result {
                    Ok(channel) => {
                        self.channel = channel;
                        true
                    }
                    Err(err) => {
                        tracing::warn!(%err, "failed to restore producer");
                        tokio::time::sleep(self.retry_interval).await;
                        false
                    }
                }
            };

            if restored {
                tracing::info!("producer restored");
                return;
            }
        }
    }

    async fn wait_for_connection(&mut self) -> Connection {
        loop {
            if let Some(connection) = self.connection_rx.borrow_and_update().clone() {
                return connection;
            }

            // connection_tx cannot be dropped before dropping the producer
            self.connection_rx.changed().await.unwrap();
        }
    }

    async fn try_restore(
        connection: &Connection,
        queue_declare_args: &QueueDeclareArguments,
    ) -> anyhow::Result<Channel> {
        tracing::info!("recreating channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("recreating queue");
        channel.queue_declare(queue_declare_args.clone()).await?;

        Ok(channel)
    }
}
