//! HTTP transport settings.
//!
//! Deserialized from the `[transport]` table of the gateway settings file.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{GatewayError, Result};

/// HTTP transport configuration.
///
/// ```toml
/// [transport]
/// pool_max_idle_per_host = 4
/// timeout_secs = 20
/// http_version = "http1"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Maximum idle connections kept to the Icepay host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// HTTP version preference.
    #[serde(default)]
    pub http_version: HttpVersion,

    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            http_version: HttpVersion::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Checks the settings before a client is built.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when `timeout_secs` is outside
    /// 1..=300, `connect_timeout_secs` outside 1..=60, or `user_agent` is
    /// empty or contains control characters.
    pub fn validate(&self) -> Result<()> {
        check_range("timeout_secs", self.timeout_secs, MAX_TIMEOUT_SECS)?;
        check_range("connect_timeout_secs", self.connect_timeout_secs, MAX_CONNECT_TIMEOUT_SECS)?;

        if self.user_agent.is_empty() || self.user_agent.chars().any(char::is_control) {
            return Err(GatewayError::Transport(
                "user_agent must be non-empty printable text".to_owned(),
            ));
        }
        Ok(())
    }

    /// Whole-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// TCP and TLS handshake timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// HTTP version preference.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/2 with prior knowledge.
    Http2,
    /// Let ALPN decide.
    #[default]
    Auto,
}

const DEFAULT_POOL_MAX_IDLE: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_CONNECT_TIMEOUT_SECS: u64 = 60;

const fn default_pool_max_idle() -> usize {
    DEFAULT_POOL_MAX_IDLE
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    concat!("icepay-gateway/", env!("CARGO_PKG_VERSION")).to_owned()
}

fn check_range(name: &str, value: u64, max: u64) -> Result<()> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(GatewayError::Transport(format!("{name} must be between 1 and {max}, got {value}")))
    }
}
