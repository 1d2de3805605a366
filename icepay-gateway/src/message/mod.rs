//! Request builders and response parsing.
//!
//! Each Icepay call is one [`Operation`]. Its request side is a type
//! implementing [`GatewayMessage`]: a pure mapping from the generic request
//! model to a verb, a path and a JSON payload. Nothing here performs I/O; the
//! [`Gateway`](crate::gateway::Gateway) signs and sends what these types build.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    config::GatewayConfig,
    error::{GatewayError, Result},
    transport::Method,
};

pub mod capture;
pub mod create_transaction;
pub mod payment_methods;
pub mod refund;
pub mod request;
pub mod response;
pub mod status;

pub use capture::CompleteCapture;
pub use create_transaction::CreateTransaction;
pub use payment_methods::PaymentMethods;
pub use refund::Refund;
pub use request::{
    Address, CaptureRequest, Consumer, PaymentMethodsRequest, PaymentRequest, RefundRequest,
    StatusRequest,
};
pub use response::{
    ErrorDetail, ErrorEnvelope, ErrorParameter, GatewayResponse, Outcome, TransactionStatus,
    UNKNOWN_ERROR, is_undocumented_cancellation,
};
pub use status::TransactionStatusLookup;

/// `chrono` format of every timestamp sent to Icepay (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Formats a timestamp the way Icepay expects it in headers and payloads.
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Icepay operation, for context in building and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a transaction (authorize).
    CreateTransaction,
    /// Complete an authorized transaction (capture).
    CompleteCapture,
    /// Refund a transaction.
    Refund,
    /// Look up the state of a transaction.
    TransactionStatus,
    /// List the payment methods enabled for the profile.
    PaymentMethods,
}

impl Operation {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTransaction => "create_transaction",
            Self::CompleteCapture => "complete_capture",
            Self::Refund => "refund",
            Self::TransactionStatus => "transaction_status",
            Self::PaymentMethods => "payment_methods",
        }
    }

    /// Whether the response describes a transaction (and so carries
    /// `contractId` and `transactionId` on success).
    #[must_use]
    pub const fn is_transaction(self) -> bool {
        !matches!(self, Self::PaymentMethods)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request side of one Icepay operation.
///
/// Implementations are pure: the same input and configuration always produce
/// the same path and payload.
pub trait GatewayMessage: Send + Sync {
    /// Operation this message performs.
    fn operation(&self) -> Operation;

    /// HTTP verb.
    fn method(&self) -> Method;

    /// Path relative to the configured base URL, including any query string.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`](crate::error::GatewayError::InvalidInput)
    /// if a path segment is missing or malformed.
    fn path(&self, config: &GatewayConfig) -> Result<String>;

    /// JSON document describing the request, if the operation has one.
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be serialized.
    fn payload(&self, config: &GatewayConfig) -> Result<Option<Value>>;

    /// Exact bytes sent as the request body and covered by the checksum.
    ///
    /// GET requests always have an empty body, even when a payload exists.
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be serialized.
    fn body(&self, config: &GatewayConfig) -> Result<Vec<u8>> {
        if self.method() == Method::Get {
            return Ok(Vec::new());
        }
        match self.payload(config)? {
            Some(payload) => Ok(serde_json::to_vec(&payload)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Validates a processor-assigned transaction reference used as a path segment.
///
/// Only RFC 3986 unreserved characters are accepted, so the signed path is
/// byte-for-byte the path on the wire.
pub(crate) fn path_segment<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(GatewayError::InvalidInput(format!("{name} must not be empty")));
    }
    if !value.bytes().all(is_unreserved) {
        return Err(GatewayError::InvalidInput(format!(
            "{name} may only contain ASCII letters, digits, '-', '.', '_' and '~'"
        )));
    }
    if value == "." || value.contains("..") {
        return Err(GatewayError::InvalidInput(format!("{name} must not be a dot segment")));
    }
    Ok(value)
}

const fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_timestamp() {
        let timestamp = Utc.with_ymd_and_hms(2019, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(&timestamp), "2019-03-09T07:05:01Z");
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::CreateTransaction.to_string(), "create_transaction");
        assert_eq!(Operation::PaymentMethods.as_str(), "payment_methods");
    }

    #[test]
    fn test_operation_is_transaction() {
        assert!(Operation::CreateTransaction.is_transaction());
        assert!(Operation::CompleteCapture.is_transaction());
        assert!(Operation::Refund.is_transaction());
        assert!(Operation::TransactionStatus.is_transaction());
        assert!(!Operation::PaymentMethods.is_transaction());
    }

    #[test]
    fn test_path_segment() {
        assert_eq!(
            path_segment("ref", "1M-MR-M33533K5-L00K-47-M3").unwrap(),
            "1M-MR-M33533K5-L00K-47-M3"
        );
        assert!(matches!(path_segment("ref", ""), Err(GatewayError::InvalidInput(_))));
        assert!(matches!(path_segment("ref", "  "), Err(GatewayError::InvalidInput(_))));
        assert!(path_segment("ref", "a/b").is_err());
        assert!(path_segment("ref", "a?b=c").is_err());
        assert!(path_segment("ref", "a b").is_err());
    }

    #[test]
    fn test_path_segment_accepts_unreserved() {
        assert!(path_segment("ref", "aZ09-._~").is_ok());
    }

    #[test]
    fn test_path_segment_rejects_bytes_the_url_would_encode() {
        for value in ["té1", "t\"1", "50%", "<x>", "{id}", "a|b", "a\\b", "a;b", "ü"] {
            assert!(
                matches!(path_segment("ref", value), Err(GatewayError::InvalidInput(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_path_segment_rejects_dot_segments() {
        for value in [".", "..", "a..b", "../refund"] {
            assert!(
                matches!(path_segment("ref", value), Err(GatewayError::InvalidInput(_))),
                "{value:?} should be rejected"
            );
        }
    }
}
