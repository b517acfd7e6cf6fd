//! Process configuration, read once from the environment at startup.
//!
//! | Variable     | Default     |
//! |--------------|-------------|
//! | `PORT`       | `3000`      |
//! | `HOST`       | `127.0.0.1` |
//! | `LOG_FORMAT` | `pretty`    |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

use crate::observability::LogFormat;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got {0:?}")]
    InvalidPort(String),

    #[error("HOST must be an IP address, got {0:?}")]
    InvalidHost(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_format: LogFormat,
    /// A `LOG_FORMAT` value that was not recognised. `log_format` falls back
    /// to pretty; the value is kept so it can be logged after tracing starts.
    pub unknown_log_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
            unknown_log_format: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys take their defaults;
    /// set but unparsable keys are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let host = match lookup("HOST") {
            Some(raw) => raw.trim().parse::<IpAddr>().map_err(|_| ConfigError::InvalidHost(raw))?,
            None => DEFAULT_HOST,
        };
        let (log_format, unknown_log_format) = match lookup("LOG_FORMAT").map(|raw| raw.parse::<LogFormat>()) {
            Some(Ok(format)) => (format, None),
            Some(Err(raw)) => (LogFormat::default(), Some(raw)),
            None => (LogFormat::default(), None),
        };

        Ok(Self {
            host,
            port,
            log_format,
            unknown_log_format,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
