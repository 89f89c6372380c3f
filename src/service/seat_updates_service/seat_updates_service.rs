use crate::dto::output::SeatUpdate;
use axum::async_trait;
use tokio::sync::broadcast;

///
/// Per-event fan-out of seat state changes to websocket subscribers
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeatUpdatesService: Send + Sync {
    ///
    /// Broadcasts the update to every subscriber of its event.
    /// A dropped update is not an error; subscribers that lag too far
    /// behind lose the oldest updates first
    ///
    async fn publish(&self, update: SeatUpdate);

    async fn subscribe(&self, event_id: i64) -> broadcast::Receiver<SeatUpdate>;
}
