//! Error types for the Icepay gateway adapter.
//!
//! Only failures that prevent a call from producing a processor response are
//! errors. A processor that answers with a validation or business-rule error
//! is not an error at this layer: the response parses into a
//! [`Failed`](crate::message::Outcome::Failed) outcome carrying the
//! processor's message.
//!
//! # Error Categories
//!
//! - **Network Errors** ([`GatewayError::Http`]): DNS, TLS, timeouts, refused connections
//! - **Transport Errors** ([`GatewayError::Transport`]): request rejected before it was sent
//! - **Input Errors** ([`GatewayError::InvalidInput`]): request cannot be mapped
//! - **Configuration Errors** ([`GatewayError::Config`]): settings cannot be loaded
//! - **Encoding Errors** ([`GatewayError::Serialization`]): payload encoding failed
//!
//! # Examples
//!
//! ```
//! use icepay_gateway::error::{GatewayError, Result};
//!
//! fn require_reference(reference: &str) -> Result<&str> {
//!     if reference.is_empty() {
//!         return Err(GatewayError::InvalidInput("transaction reference is required".to_owned()));
//!     }
//!     Ok(reference)
//! }
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to Icepay.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]. The adapter never retries; the caller
    /// decides whether the operation is safe to repeat.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport refused to send the request.
    ///
    /// Raised for non-HTTPS or loopback base URLs, malformed paths and
    /// header values containing control characters.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request cannot be mapped onto the Icepay API.
    ///
    /// # Examples
    ///
    /// ```
    /// use icepay_gateway::error::GatewayError;
    ///
    /// let err = GatewayError::InvalidInput("transaction reference is required".to_owned());
    /// assert!(err.to_string().contains("invalid input"));
    /// ```
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Gateway settings could not be read or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GatewayError::Transport("refusing loopback host".into());
        assert_eq!(error.to_string(), "transport error: refusing loopback host");
    }

    #[test]
    fn test_invalid_input_error() {
        let error = GatewayError::InvalidInput("missing reference".to_owned());
        assert_eq!(error.to_string(), "invalid input: missing reference");
    }

    #[test]
    fn test_config_error() {
        let error = GatewayError::Config("contract_profile_id is empty".to_owned());
        assert!(error.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_serialization_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = GatewayError::from(json_err);
        assert!(matches!(error, GatewayError::Serialization(_)));
    }
}
