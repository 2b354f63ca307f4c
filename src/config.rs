use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),
}

/// Process configuration, read once at startup from the environment
/// (optionally seeded from a .env file).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub identity_service_url: String,
    /// Bound on every identity-service call, compensation included.
    pub identity_timeout: Duration,
    /// Bound on the provisioning transaction.
    pub database_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            dotenvy::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let identity_service_url = dotenvy::var("IDENTITY_SERVICE_URL")
            .map_err(|_| ConfigError::Missing("IDENTITY_SERVICE_URL"))?;

        let identity_timeout = seconds_var("IDENTITY_TIMEOUT_SECS", 10)?;
        let database_timeout = seconds_var("DATABASE_TIMEOUT_SECS", 10)?;

        let port = match dotenvy::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url,
            identity_service_url,
            identity_timeout,
            database_timeout,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
        })
    }
}

fn seconds_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match dotenvy::var(name) {
        Ok(value) => value
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
