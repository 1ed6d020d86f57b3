//! Configuration: broker client settings and the bridge service's own settings.

mod client;

pub use client::*;

use std::net::SocketAddr;

use crate::error::AppError;

/// Bridge service configuration loaded from `.env` and environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// Key callers must send in `x-app-key` to sign or publish through the bridge.
    pub app_key: String,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Broker connection settings.
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let server_addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let app_key = std::env::var("APP_KEY").unwrap_or_default();
        if app_key.trim().is_empty() {
            return Err(ConfigLoadError::MissingAppKey);
        }
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let client = ClientConfig::from_env()?;

        Ok(Self {
            server_addr,
            app_key,
            log_level,
            client,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,

    #[error("APP_KEY must be set")]
    MissingAppKey,

    #[error(transparent)]
    Client(#[from] AppError),
}
