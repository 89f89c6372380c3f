use super::HoldCleanupServiceConfig;
use crate::service::tickets_service::TicketsService;
use std::sync::Arc;
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

///
/// Background sweep releasing holds whose window lapsed without a
/// purchase. Holds are also released lazily on access, the sweep only
/// puts a bound on how long a lapsed hold can linger in storage
///
pub struct HoldCleanupService {
    task_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl HoldCleanupService {
    pub fn new(config: HoldCleanupServiceConfig, tickets_service: Arc<dyn TicketsService>) -> Self {
        let close_notify = Arc::new(Notify::new());
        let close_notify_clone = Arc::clone(&close_notify);
        let task_handle = tokio::spawn(async move {
            sweep_loop(config, tickets_service, close_notify_clone).await;
        });

        Self {
            task_handle,
            close_notify,
        }
    }

    pub async fn close(self) {
        tracing::info!("closing hold cleanup");

        self.close_notify.notify_one();

        // task cannot fail/panic
        self.task_handle.await.unwrap();

        tracing::info!("hold cleanup closed");
    }
}

#[tracing::instrument(name = "Hold Cleanup", skip_all)]
async fn sweep_loop(
    config: HoldCleanupServiceConfig,
    tickets_service: Arc<dyn TicketsService>,
    close_notify: Arc<Notify>,
) {
    tracing::info!("sweep loop started");

    let mut interval = interval(config.sweep_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::select! {
        biased;

        _ = close_notify.notified() => {}

        _ = async { loop {
            interval.tick().await;

            match tickets_service.release_expired_holds().await {
                Ok(0) => tracing::debug!("no lapsed holds"),
                Ok(released) => tracing::info!(released, "released lapsed holds"),
                Err(err) => tracing::warn!(%err, "failed to release lapsed holds"),
            }
        }} => {}
    }

    tracing::info!("sweep loop finished");
}
