use rust_decimal::Decimal;
use std::time::Duration;

pub struct TicketsServiceConfig {
    ///
    /// How long a hold keeps a seat reserved before it lapses
    ///
    pub hold_window: Duration,

    ///
    /// Tax rate applied on top of the invoice subtotal, e.g. 0.12
    ///
    pub tax_rate: Decimal,

    ///
    /// How many times an operation losing an optimistic version race
    /// is retried before surfacing a conflict
    ///
    pub conflict_retries: u32,
}
