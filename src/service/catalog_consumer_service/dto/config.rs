pub struct CatalogConsumerServiceConfig {
    pub queue: String,
}
