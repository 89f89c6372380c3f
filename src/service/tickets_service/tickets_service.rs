use crate::{
    dto::{input, output},
    error::Error,
};
use axum::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketsService: Send + Sync {
    ///
    /// Seats of the event ordered by number. Holds that already lapsed
    /// are reported as available without touching stored state
    ///
    async fn list_seats(&self, event_id: i64) -> Result<Vec<output::SeatView>, Error>;

    ///
    /// Places a hold on every requested seat, all or nothing
    ///
    async fn hold_seats(&self, request: input::HoldSeats) -> Result<Vec<output::SeatView>, Error>;

    ///
    /// Converts held seats into tickets under a single invoice,
    /// all or nothing
    ///
    async fn purchase(&self, request: input::Purchase) -> Result<output::Invoice, Error>;

    async fn find_purchases(&self, national_id: &str) -> Result<Vec<output::Purchase>, Error>;

    async fn metrics(&self, period: input::MetricsPeriod) -> Result<output::Metrics, Error>;

    ///
    /// ### Returns
    /// number of lapsed holds released
    ///
    async fn release_expired_holds(&self) -> Result<u64, Error>;
}
