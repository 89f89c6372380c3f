use axum::async_trait;

///
/// Service used to propagate ticketing activity to any interested party
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsProducerService: Send + Sync {
    async fn send_purchase(&self, first_name: &str, last_name: &str, event_id: i64);

    async fn send_catalog_change(&self, message: String);
}
