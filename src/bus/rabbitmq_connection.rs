use super::retry::retry_forever;
use amqprs::{
    callbacks::ConnectionCallback,
    connection::{Connection, OpenConnectionArguments},
    Close,
};
use axum::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

#[derive(Clone)]
pub struct RabbitmqConnectionConfig {
    pub retry_interval: Duration,
}

///
/// RabbitMQ connection shared by producers and consumers.
/// A background task recreates the underlying connection whenever
/// network io fails; consumers of [Self::connection] observe None
/// while the connection is down and a fresh [Connection] once restored.
///
#[derive(Clone)]
pub struct RabbitmqConnection {
    inner: Arc<RabbitmqConnectionInner>,
}

struct RabbitmqConnectionInner {
    config: RabbitmqConnectionConfig,

    connection_rx: watch::Receiver<Option<Connection>>,

    keep_alive_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl RabbitmqConnection {
    #[tracing::instrument(name = "RabbitMQ Connection", skip_all)]
    pub async fn new(
        config: RabbitmqConnectionConfig,
        open_connection_args: OpenConnectionArguments,
    ) -> Result<Self, amqprs::error::Error> {
        tracing::info!("opening connection");
        let connection = Connection::open(&open_connection_args).await?;

        tracing::info!("registering callback");
        connection.register_callback(LoggingConnectionCallback).await?;

        tracing::info!("starting keep alive task");
        let close_notify = Arc::new(Notify::new());
        let (connection_tx, connection_rx) = watch::channel(Some(connection.clone()));
        let reconnect_loop = ReconnectLoop {
            retry_interval: config.retry_interval,
            connection,
            connection_tx,
            open_connection_args,
        };
        let keep_alive_handle = tokio::spawn(keep_alive(Arc::clone(&close_notify), reconnect_loop));

        tracing::info!("connection opened");

        Ok(Self {
            inner: Arc::new(RabbitmqConnectionInner {
                config,
                connection_rx,
                keep_alive_handle,
                close_notify,
            }),
        })
    }

    ///
    /// Close underlying connection and the task that recreates it.
    ///
    /// ### Errors
    /// Returns an error when it is not the last clone of the connection
    ///
    #[tracing::instrument(name = "RabbitMQ Connection", skip_all)]
    pub async fn close(self) -> anyhow::Result<()> {
        let Ok(inner) = Arc::try_unwrap(self.inner) else {
            anyhow::bail!("closing connection when connection clones exist is forbidden");
        };

        tracing::info!("closing keep alive task");
        inner.close_notify.notify_one();
        inner.keep_alive_handle.await.unwrap(); // task can't be aborted and will never panic
        tracing::info!("closed keep alive task");

        tracing::info!("closing connection");
        match inner.connection_rx.borrow().clone() {
            Some(connection) => match connection.close().await {
                Ok(()) => tracing::info!("connection closed"),
                Err(err) => tracing::warn!(%err, "closing connection failed"),
            },
            None => tracing::info!("connection already closed"),
        }

        Ok(())
    }

    pub fn config(&self) -> &RabbitmqConnectionConfig {
        &self.inner.config
    }

    pub fn connection(&self) -> watch::Receiver<Option<Connection>> {
        self.inner.connection_rx.clone()
    }
}

#[tracing::instrument(name = "RabbitMQ Connection", skip_all)]
async fn keep_alive(close_notify: Arc<Notify>, mut reconnect_loop: ReconnectLoop) {
    tracing::info!("keep alive started");

    tokio::select! {
        biased;

        _ = close_notify.notified() => {}
        _ = reconnect_loop.run() => {}
    }

    tracing::info!("keep alive finished");
}

struct ReconnectLoop {
    retry_interval: Duration,

    connection: Connection,
    connection_tx: watch::Sender<Option<Connection>>,

    open_connection_args: OpenConnectionArguments,
}

impl ReconnectLoop {
    async fn run(&mut self) {
        loop {
            self.connection.listen_network_io_failure().await;
            tracing::warn!("connection broken");
            self.connection_tx.send_replace(None);

            self.connection = retry_forever(self.retry_interval, "open connection", || async {
                Connection::open(&self.open_connection_args).await
            })
            .await;

            retry_forever(self.retry_interval, "register connection callback", || async {
                self.connection
                    .register_callback(LoggingConnectionCallback)
                    .await
            })
            .await;

            // Connection is published only once the callback is back in place
            self.connection_tx.send_replace(Some(self.connection.clone()));
            tracing::info!("connection recreated");
        }
    }
}

struct LoggingConnectionCallback;

#[async_trait]
impl ConnectionCallback for LoggingConnectionCallback {
    #[tracing::instrument(name = "RabbitMQ Connection Callback", skip_all)]
    async fn close(
        &mut self,
        _connection: &Connection,
        close: Close,
    ) -> Result<(), amqprs::error::Error> {
        tracing::warn!(
            code = close.reply_code(),
            text = close.reply_text(),
            "received close",
        );

        Ok(())
    }

    #[tracing::instrument(name = "RabbitMQ Connection Callback", skip_all)]
    async fn blocked(&mut self, _connection: &Connection, reason: String) {
        tracing::warn!(reason, "received blocked");
    }

    #[tracing::instrument(name = "RabbitMQ Connection Callback", skip_all)]
    async fn unblocked(&mut self, _connection: &Connection) {
        tracing::info!("received unblocked");
    }
}
