use thiserror::Error;
use tracing::warn;

use crate::auth::TokenConfig;

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";
const DEFAULT_EXPIRATION_MS: i64 = 86_400_000; // 24 hours
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got `{value}`")]
    InvalidNumber { name: &'static str, value: String },
}

/// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    /// PostgreSQL connection string; in-memory stores are used when absent
    pub database_url: Option<String>,
    pub token: TokenConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, falling back to the development secret");
            DEFAULT_SECRET.to_string()
        });

        let expiration_ms = match lookup("JWT_EXPIRATION_MS") {
            Some(value) => match value.trim().parse::<i64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "JWT_EXPIRATION_MS",
                        value,
                    })
                }
            },
            None => DEFAULT_EXPIRATION_MS,
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            token: TokenConfig::new(secret, expiration_ms),
        })
    }
}
