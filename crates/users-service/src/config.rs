//! Service configuration.

use outbox_shared::config::{
    BrokerConfig, ConfigError, DatabaseConfig, ServerConfig, WorkerConfig, load_dotenv,
};

const DEFAULT_DB_NAME: &str = "users_db";
const DEFAULT_EXCHANGE: &str = "user.events";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub broker: BrokerConfig,
    pub worker: WorkerConfig,
}

impl ServiceConfig {
    pub fn load() -> Result<Self, ConfigError> {
        load_dotenv();
        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env(DEFAULT_DB_NAME)?,
            broker: BrokerConfig::from_env(DEFAULT_EXCHANGE)?,
            worker: WorkerConfig::from_env()?,
        })
    }
}
