//! Application configuration module
//!
//! Configuration is read from environment variables with the `RELATION_API`
//! prefix; nested values are separated by a double underscore.
//!
//! # Example
//!
//! ```no_run
//! use relation_api::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod pipeline;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use pipeline::PipelineConfig;
pub use server::{LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection; the only section without usable defaults
    pub database: DatabaseConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file is read first when present.
    ///
    /// - `RELATION_API__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `RELATION_API__DATABASE__URL=...` -> `database.url = ...`
    /// - `RELATION_API__PIPELINE__OFFER_VALIDITY_DAYS=30`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("RELATION_API")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "RELATION_API__DATABASE__URL",
        "RELATION_API__SERVER__PORT",
        "RELATION_API__SERVER__LOG_FORMAT",
        "RELATION_API__PIPELINE__OFFER_VALIDITY_DAYS",
        "RELATION_API__PIPELINE__DEFAULT_CURRENCY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("RELATION_API__DATABASE__URL", "postgresql://test@localhost/test");
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config loads");
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pipeline.offer_validity_days, 60);
        assert_eq!(config.pipeline.default_currency, "NOK");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("RELATION_API__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("RELATION_API__SERVER__PORT", "9000");
        env::set_var("RELATION_API__SERVER__LOG_FORMAT", "pretty");
        env::set_var("RELATION_API__PIPELINE__OFFER_VALIDITY_DAYS", "30");
        env::set_var("RELATION_API__PIPELINE__DEFAULT_CURRENCY", "EUR");
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config loads");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_format, LogFormat::Pretty);
        assert_eq!(config.pipeline.offer_validity_days, 30);
        assert_eq!(config.pipeline.default_currency, "EUR");
    }

    #[test]
    fn test_missing_database_url_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
