//! Configuration loaded from the process environment.
//!
//! Every option is required. A `.env` file in the working directory, when present, is loaded
//! first; variables already set in the environment win over it.

use std::{env, time::Duration};
use thiserror::Error;
use tracing::Level;

const HOST: &str = "HOST";
const PORT: &str = "PORT";
const DYNAMODB_ENDPOINT: &str = "DYNAMODB_ENDPOINT";
const LOG_LEVEL: &str = "LOG_LEVEL";
const SHUTDOWN_TIMEOUT: &str = "SHUTDOWN_TIMEOUT";

/// Errors raised while loading [`Config`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("required environment variable `{0}` is not set")]
    Missing(&'static str),
    /// A variable is set to a value that cannot be used.
    #[error("environment variable `{name}` has invalid value `{value}`: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Value as read.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Service configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Interface to listen on.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Endpoint URL of the DynamoDB API.
    pub dynamodb_endpoint: String,
    /// Minimum level of emitted log events.
    pub log_level: Level,
    /// Seconds to wait for in-flight requests once shutdown starts.
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads every option through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let port = required(PORT)?;
        let log_level = required(LOG_LEVEL)?;
        let shutdown_timeout = required(SHUTDOWN_TIMEOUT)?;
        Ok(Self {
            host: required(HOST)?,
            port: port.parse().map_err(|err: std::num::ParseIntError| ConfigError::Invalid {
                name: PORT,
                reason: err.to_string(),
                value: port.clone(),
            })?,
            dynamodb_endpoint: required(DYNAMODB_ENDPOINT)?,
            log_level: parse_log_level(&log_level).ok_or_else(|| ConfigError::Invalid {
                name: LOG_LEVEL,
                reason: "expected one of debug, info, warn, error".to_string(),
                value: log_level.clone(),
            })?,
            shutdown_timeout_secs: shutdown_timeout.parse().map_err(
                |err: std::num::ParseIntError| ConfigError::Invalid {
                    name: SHUTDOWN_TIMEOUT,
                    reason: err.to_string(),
                    value: shutdown_timeout.clone(),
                },
            )?,
        })
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Upper bound on the graceful drain.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn parse_log_level(value: &str) -> Option<Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}
