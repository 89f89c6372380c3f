use anyhow::anyhow;
use rust_decimal::Decimal;
use std::{net::SocketAddr, time::Duration};

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub bind_address: SocketAddr,

    pub db_connection_string: String,
    pub db_name: String,

    pub rabbitmq_connection_string: String,
    pub rabbitmq_retry_interval: Duration,
    pub rabbitmq_events_queue_name: String,
    pub rabbitmq_notifications_queue_name: String,

    pub hold_window: Duration,
    pub tax_rate: Decimal,
    pub conflict_retries: u32,
    pub sweep_interval: Duration,
    pub seat_updates_channel_capacity: usize,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("ENCUENTRO_TICKETS_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("ENCUENTRO_TICKETS_LOG_FILENAME")?;
        let bind_address = Self::env_var("ENCUENTRO_TICKETS_BIND_ADDRESS")?.parse()?;
        let db_connection_string = Self::env_var("ENCUENTRO_TICKETS_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("ENCUENTRO_TICKETS_DB_NAME")?;
        let rabbitmq_connection_string =
            Self::env_var("ENCUENTRO_TICKETS_RABBITMQ_CONNECTION_STRING")?;
        let rabbitmq_retry_interval =
            Self::env_var_or("ENCUENTRO_TICKETS_RABBITMQ_RETRY_INTERVAL", "10").parse()?;
        let rabbitmq_retry_interval = Duration::from_secs(rabbitmq_retry_interval);
        let rabbitmq_events_queue_name =
            Self::env_var_or("ENCUENTRO_TICKETS_RABBITMQ_EVENTS_QUEUE_NAME", "eventos.cola");
        let rabbitmq_notifications_queue_name = Self::env_var_or(
            "ENCUENTRO_TICKETS_RABBITMQ_NOTIFICATIONS_QUEUE_NAME",
            "notificaciones.cola",
        );
        let hold_window = Self::env_var_or("ENCUENTRO_TICKETS_HOLD_WINDOW", "60").parse()?;
        let hold_window = Duration::from_secs(hold_window);
        let tax_rate = Self::env_var_or("ENCUENTRO_TICKETS_TAX_RATE", "0.12").parse()?;
        let conflict_retries =
            Self::env_var_or("ENCUENTRO_TICKETS_CONFLICT_RETRIES", "3").parse()?;
        let sweep_interval = Self::env_var_or("ENCUENTRO_TICKETS_SWEEP_INTERVAL", "30").parse()?;
        let sweep_interval = Duration::from_secs(sweep_interval);
        let seat_updates_channel_capacity =
            Self::env_var_or("ENCUENTRO_TICKETS_SEAT_UPDATES_CHANNEL_CAPACITY", "256").parse()?;

        Ok(Self {
            log_directory,
            log_filename,
            bind_address,
            db_connection_string,
            db_name,
            rabbitmq_connection_string,
            rabbitmq_retry_interval,
            rabbitmq_events_queue_name,
            rabbitmq_notifications_queue_name,
            hold_window,
            tax_rate,
            conflict_retries,
            sweep_interval,
            seat_updates_channel_capacity,
        })
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }

    fn env_var_or(name: &'static str, default: &str) -> String {
        std::env::var(name).unwrap_or_else(|_| default.to_string())
    }
}
