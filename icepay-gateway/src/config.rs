//! Gateway credentials, environment selection and TOML settings.
//!
//! [`GatewayConfig`] is the immutable value every operation reads from. It is
//! built once and shared read-only, so concurrent callers need no
//! coordination. [`GatewaySettings`] is the optional TOML front end that
//! produces a config plus transport settings.

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;
use zeroize::Zeroize;

use crate::{
    error::{GatewayError, Result},
    transport::{HttpConfig, is_loopback},
};

/// Production Interconnect endpoint.
pub const API_BASE_URL: &str = "https://interconnect.icepay.com/api";

/// Acceptance (test) Interconnect endpoint.
pub const TEST_API_BASE_URL: &str = "https://acc-interconnect.icepay.com/api";

/// Shared secret used to compute request checksums.
///
/// Never transmitted. Redacted in `Debug` output and wiped on drop.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wraps a secret key as issued by Icepay.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret for local signing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no secret was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl From<&str> for SecretKey {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

/// How `complete_capture` talks to Icepay.
///
/// Two published variants of this gateway disagree: one re-submits the
/// create-transaction payload, the other performs a status lookup on the
/// existing transaction. Neither is documented by Icepay as the capture call,
/// so the choice is left to the integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// `GET /transaction/{reference}` and report the resulting state.
    #[default]
    StatusCheck,
    /// `POST /contract/transaction` with the full create-transaction payload.
    ResubmitTransaction,
}

/// Immutable per-gateway configuration.
///
/// # Examples
///
/// ```
/// use icepay_gateway::config::{GatewayConfig, TEST_API_BASE_URL};
///
/// let config = GatewayConfig::new("64eb3717-8b5d-4088-8108-93224675e538", "c2VjcmV0", true);
/// assert_eq!(config.base_url(), TEST_API_BASE_URL);
/// ```
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    contract_profile_id: String,
    secret_key: SecretKey,
    test_mode: bool,
    base_url: String,
    capture_mode: CaptureMode,
}

impl GatewayConfig {
    /// Creates a configuration; the base URL follows `test_mode`.
    ///
    /// Performs no validation and no I/O.
    #[must_use]
    pub fn new(
        contract_profile_id: impl Into<String>,
        secret_key: impl Into<SecretKey>,
        test_mode: bool,
    ) -> Self {
        let base_url = if test_mode { TEST_API_BASE_URL } else { API_BASE_URL };
        Self {
            contract_profile_id: contract_profile_id.into(),
            secret_key: secret_key.into(),
            test_mode,
            base_url: base_url.to_owned(),
            capture_mode: CaptureMode::default(),
        }
    }

    /// Overrides the base URL (proxies, sandboxes, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Selects the capture semantics.
    #[must_use]
    pub const fn with_capture_mode(mut self, capture_mode: CaptureMode) -> Self {
        self.capture_mode = capture_mode;
        self
    }

    /// Merchant profile identifier (the `USERID`).
    #[must_use]
    pub fn contract_profile_id(&self) -> &str {
        &self.contract_profile_id
    }

    /// Secret key used for checksums.
    #[must_use]
    pub const fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Whether the acceptance environment is selected.
    #[must_use]
    pub const fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// Base URL all paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured capture semantics.
    #[must_use]
    pub const fn capture_mode(&self) -> CaptureMode {
        self.capture_mode
    }
}

impl From<String> for SecretKey {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

/// Gateway settings loaded from TOML.
///
/// ```toml
/// contract_profile_id = "64eb3717-8b5d-4088-8108-93224675e538"
/// secret_key = "NjRlYjM3MTctOGI1ZC00MDg4LTgxMDgtOTMyMjQ2NzVlNTM4"
/// test_mode = true
/// capture_mode = "status_check"
///
/// [transport]
/// timeout_secs = 20
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Merchant profile identifier.
    pub contract_profile_id: String,

    /// Shared secret.
    pub secret_key: SecretKey,

    /// Use the acceptance environment.
    #[serde(default)]
    pub test_mode: bool,

    /// Explicit base URL, overriding the `test_mode` selection.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Capture semantics.
    #[serde(default)]
    pub capture_mode: CaptureMode,

    /// HTTP transport settings.
    #[serde(default)]
    pub transport: HttpConfig,
}

impl GatewaySettings {
    /// Parses and validates settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if parsing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let settings: Self = toml::from_str(toml_str)
            .map_err(|e| GatewayError::Config(format!("invalid TOML config: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the file cannot be read or is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GatewayError::Config(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Checks the settings before any request is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] for an empty or malformed profile id,
    /// a base URL override that is not HTTPS or points at loopback, or
    /// out-of-range transport timeouts.
    pub fn validate(&self) -> Result<()> {
        if self.contract_profile_id.trim().is_empty() {
            return Err(GatewayError::Config("contract_profile_id must not be empty".to_owned()));
        }

        if self.contract_profile_id.chars().any(char::is_control) {
            return Err(GatewayError::Config(
                "contract_profile_id contains control characters".to_owned(),
            ));
        }

        if let Some(ref base_url) = self.base_url {
            validate_base_url(base_url)?;
        }

        self.transport
            .validate()
            .map_err(|e| GatewayError::Config(format!("transport: {e}")))
    }

    /// Builds the immutable gateway configuration.
    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        let config =
            GatewayConfig::new(&*self.contract_profile_id, self.secret_key.clone(), self.test_mode)
                .with_capture_mode(self.capture_mode);

        match self.base_url {
            Some(ref base_url) => config.with_base_url(base_url.trim_end_matches('/')),
            None => config,
        }
    }
}

/// Validates a base URL override.
fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url)
        .map_err(|e| GatewayError::Config(format!("invalid base_url '{base_url}': {e}")))?;

    if url.scheme() != "https" {
        return Err(GatewayError::Config(format!(
            "base_url must use HTTPS, got: {}",
            url.scheme()
        )));
    }

    if is_loopback(&url) {
        return Err(GatewayError::Config(format!(
            "base_url must not be localhost or loopback: {}",
            url.host_str().unwrap_or_default()
        )));
    }

    Ok(())
}
