//! Application configuration module
//!
//! Settings come from environment variables (and a `.env` file in
//! development) through the `config` and `dotenvy` crates. Variables use the
//! `ASSESSOR_LIVE` prefix with `__` between nesting levels. Every setting has
//! a default, so an empty environment yields a runnable configuration.
//!
//! | Variable                                   | Field                        |
//! |--------------------------------------------|------------------------------|
//! | `ASSESSOR_LIVE__SERVER__PORT`              | `server.port`                |
//! | `ASSESSOR_LIVE__SERVER__ENVIRONMENT`       | `server.environment`         |
//! | `ASSESSOR_LIVE__SERVER__CORS_ORIGINS`      | `server.cors_origins`        |
//! | `ASSESSOR_LIVE__REALTIME__WS_PATH`         | `realtime.ws_path`           |
//! | `ASSESSOR_LIVE__REALTIME__MAX_MESSAGE_BYTES` | `realtime.max_message_bytes` |
//!
//! # Example
//!
//! ```no_run
//! use assessor_live::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod realtime;
mod server;

pub use error::{ConfigError, ValidationError};
pub use realtime::RealtimeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "ASSESSOR_LIVE";
const ENV_SEPARATOR: &str = "__";

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub realtime: RealtimeConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be converted to its field type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR);

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.realtime.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
