//! `GET /transaction/{reference}`.

use serde_json::Value;

use super::{GatewayMessage, Operation, path_segment, request::StatusRequest};
use crate::{config::GatewayConfig, error::Result, transport::Method};

/// Path of the status lookup for `transaction_reference`.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`](crate::error::GatewayError::InvalidInput)
/// if the reference is empty or not a single path segment.
pub fn path(transaction_reference: &str) -> Result<String> {
    let reference = path_segment("transaction_reference", transaction_reference)?;
    Ok(format!("/transaction/{reference}"))
}

/// Transaction status lookup. No body.
#[derive(Debug, Clone, Copy)]
pub struct TransactionStatusLookup<'a> {
    request: &'a StatusRequest,
}

impl<'a> TransactionStatusLookup<'a> {
    /// Wraps `request`.
    #[must_use]
    pub const fn new(request: &'a StatusRequest) -> Self {
        Self { request }
    }
}

impl GatewayMessage for TransactionStatusLookup<'_> {
    fn operation(&self) -> Operation {
        Operation::TransactionStatus
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self, _config: &GatewayConfig) -> Result<String> {
        path(&self.request.transaction_reference)
    }

    fn payload(&self, _config: &GatewayConfig) -> Result<Option<Value>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    fn config() -> GatewayConfig {
        GatewayConfig::new("1-4M-4-B1G-B1G-G1RL", "c2VjcmV0", true)
    }

    #[test]
    fn test_status_path() {
        let request = StatusRequest::new("1M-MR-M33533K5-L00K-47-M3");
        let message = TransactionStatusLookup::new(&request);

        assert_eq!(message.method(), Method::Get);
        assert_eq!(message.operation(), Operation::TransactionStatus);
        assert_eq!(message.path(&config()).unwrap(), "/transaction/1M-MR-M33533K5-L00K-47-M3");
    }

    #[test]
    fn test_status_has_no_body() {
        let request = StatusRequest::new("abc");
        let message = TransactionStatusLookup::new(&request);

        assert!(message.payload(&config()).unwrap().is_none());
        assert!(message.body(&config()).unwrap().is_empty());
    }

    #[test]
    fn test_status_rejects_empty_reference() {
        let request = StatusRequest::new("");
        let result = TransactionStatusLookup::new(&request).path(&config());
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
    }
}
