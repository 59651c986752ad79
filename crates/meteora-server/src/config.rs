use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("METEORA_PORT must be a port number, got {0:?}")]
    Port(String),

    #[error("invalid listen address {0:?}")]
    Addr(String),
}

/// Process settings, read from `METEORA_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("METEORA_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("METEORA_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Port(raw))?,
            None => 8080,
        };
        let db_path = lookup("METEORA_DB_PATH").unwrap_or_else(|| "meteora.db".into());

        Ok(Self {
            host,
            port,
            db_path: PathBuf::from(db_path),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Addr(addr))
    }
}
