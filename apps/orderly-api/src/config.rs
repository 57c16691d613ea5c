//! Orderly configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                     | Default        |
//! |------------------------------|----------------|
//! | `ORDERLY_DB_PATH`            | `orderly.db`   |
//! | `ORDERLY_DB_MAX_CONNECTIONS` | `5`            |
//! | `JWT_SECRET`                 | dev secret     |
//! | `JWT_LIFETIME_SECS`          | `86400` (24h)  |

use serde::{Deserialize, Serialize};
use std::env;

/// Path value that selects an in-memory database.
pub const IN_MEMORY_DB: &str = ":memory:";

const DEV_JWT_SECRET: &str = "orderly-dev-secret-change-in-production";

/// Orderly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file, or `:memory:`
    pub db_path: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Secret key for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub jwt_lifetime_secs: i64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig {
            db_path: lookup("ORDERLY_DB_PATH").unwrap_or_else(|| "orderly.db".to_string()),

            db_max_connections: lookup("ORDERLY_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ORDERLY_DB_MAX_CONNECTIONS".to_string()))?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| {
                // In production, this MUST be set via environment variable
                DEV_JWT_SECRET.to_string()
            }),

            jwt_lifetime_secs: lookup("JWT_LIFETIME_SECS")
                .unwrap_or_else(|| "86400".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration for an isolated in-memory database.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        AppConfig {
            db_path: IN_MEMORY_DB.to_string(),
            db_max_connections: 1,
            jwt_secret: jwt_secret.into(),
            jwt_lifetime_secs: 86400,
        }
    }

    /// Whether the configured database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }

    /// Whether the development secret is still in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("ORDERLY_DB_PATH".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("ORDERLY_DB_MAX_CONNECTIONS".to_string()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
