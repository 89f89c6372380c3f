pub struct SeatUpdatesServiceConfig {
    ///
    /// How many updates a slow subscriber can lag behind
    /// before older ones are dropped
    ///
    pub channel_capacity: usize,
}
