pub struct NotificationsProducerServiceConfig {
    pub queue: String,
}
