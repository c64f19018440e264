use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use common::config::{BreakerConfig, MailConfig, PushConfig, RetryConfig, SweepConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    pub push: PushConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("mail.max_batch_size", 100)?
            .set_default("push.max_batch_size", 500)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., MUSTER__DATABASE__URL)
            .add_source(Environment::with_prefix("MUSTER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
