use std::time::Duration;

pub struct HoldCleanupServiceConfig {
    ///
    /// How often lapsed holds are swept back to available
    ///
    pub sweep_interval: Duration,
}
