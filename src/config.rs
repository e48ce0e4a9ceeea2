//! Application configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ServiceError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Listen address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// How long to wait for in-flight requests after an interrupt (e.g. `15s`, `1m`).
    #[serde(
        default = "default_graceful_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub graceful_timeout: Duration,

    /// Per-request timeout; requests running longer get a 408.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,

    // === Store ===
    /// Start with the two seed items.
    #[serde(default = "default_true")]
    pub seed_items: bool,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_graceful_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// Parse a duration such as `500ms`, `15s`, `1m` or `2h`.
///
/// A bare integer is read as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration {raw:?}: expected e.g. 15s or 1m"))?;

    let secs_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(value)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => return Err(format!("invalid duration unit {other:?} in {raw:?}")),
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("invalid duration {raw:?}: too large"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            graceful_timeout: default_graceful_timeout(),
            request_timeout: default_request_timeout(),
            seed_items: true,
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ServiceError> {
        self.socket_addr()?;

        if self.port == 0 {
            return Err(ServiceError::InvalidConfig("PORT must be non-zero".to_string()));
        }

        if self.graceful_timeout.is_zero() {
            return Err(ServiceError::InvalidConfig(
                "GRACEFUL_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ServiceError::InvalidConfig(
                "REQUEST_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The address the listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServiceError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ServiceError::InvalidConfig(format!("HOST {:?} is not an IP address", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
