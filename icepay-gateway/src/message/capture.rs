//! Completing an authorized transaction.
//!
//! Icepay documents no dedicated capture call. Depending on
//! [`CaptureMode`], completion either looks the transaction up or re-submits
//! the original create-transaction document.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{
    GatewayMessage, Operation, create_transaction::CreateTransaction, path_segment,
    request::CaptureRequest, status,
};
use crate::{
    config::{CaptureMode, GatewayConfig},
    error::{GatewayError, Result},
    transport::Method,
};

/// Capture request under a fixed [`CaptureMode`].
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use icepay_gateway::{
///     config::{CaptureMode, GatewayConfig},
///     message::{CaptureRequest, CompleteCapture, GatewayMessage},
///     transport::Method,
/// };
///
/// let config = GatewayConfig::new("profile", "c2VjcmV0", true);
/// let request = CaptureRequest { transaction_reference: "abc".to_owned(), ..Default::default() };
///
/// let message = CompleteCapture::new(&request, CaptureMode::StatusCheck, Utc::now());
/// assert_eq!(message.method(), Method::Get);
/// assert_eq!(message.path(&config).unwrap(), "/transaction/abc");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompleteCapture<'a> {
    request: &'a CaptureRequest,
    mode: CaptureMode,
    timestamp: DateTime<Utc>,
}

impl<'a> CompleteCapture<'a> {
    /// Wraps `request` for `mode`, stamped with `timestamp`.
    #[must_use]
    pub const fn new(
        request: &'a CaptureRequest,
        mode: CaptureMode,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { request, mode, timestamp }
    }

    /// Capture semantics in use.
    #[must_use]
    pub const fn mode(&self) -> CaptureMode {
        self.mode
    }

    fn resubmission(&self) -> Result<CreateTransaction<'a>> {
        let payment = self.request.payment.as_ref().ok_or_else(|| {
            GatewayError::InvalidInput(
                "capture by re-submission requires the original payment".to_owned(),
            )
        })?;
        Ok(CreateTransaction::new(payment, self.timestamp))
    }
}

impl GatewayMessage for CompleteCapture<'_> {
    fn operation(&self) -> Operation {
        Operation::CompleteCapture
    }

    fn method(&self) -> Method {
        match self.mode {
            CaptureMode::StatusCheck => Method::Get,
            CaptureMode::ResubmitTransaction => Method::Post,
        }
    }

    fn path(&self, config: &GatewayConfig) -> Result<String> {
        match self.mode {
            CaptureMode::StatusCheck => status::path(&self.request.transaction_reference),
            CaptureMode::ResubmitTransaction => {
                path_segment("transaction_reference", &self.request.transaction_reference)?;
                self.resubmission()?.path(config)
            }
        }
    }

    fn payload(&self, config: &GatewayConfig) -> Result<Option<Value>> {
        match self.mode {
            CaptureMode::StatusCheck => Ok(None),
            CaptureMode::ResubmitTransaction => self.resubmission()?.payload(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{amount::MinorUnits, message::request::PaymentRequest};

    fn config() -> GatewayConfig {
        GatewayConfig::new("64eb3717-8b5d-4088-8108-93224675e538", "c2VjcmV0", true)
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 3, 9, 15, 4, 5).unwrap()
    }

    fn capture_request() -> CaptureRequest {
        CaptureRequest {
            transaction_reference: "1M-MR-M33533K5-L00K-47-M3".to_owned(),
            payment: Some(PaymentRequest {
                amount: MinorUnits::new(1599),
                currency_code: "EUR".to_owned(),
                transaction_id: "order-1".to_owned(),
                ..Default::default()
            }),
            timestamp: None,
        }
    }

    #[test]
    fn test_status_check_mode() {
        let request = capture_request();
        let message = CompleteCapture::new(&request, CaptureMode::StatusCheck, timestamp());

        assert_eq!(message.operation(), Operation::CompleteCapture);
        assert_eq!(message.method(), Method::Get);
        assert_eq!(message.path(&config()).unwrap(), "/transaction/1M-MR-M33533K5-L00K-47-M3");
        assert!(message.payload(&config()).unwrap().is_none());
        assert!(message.body(&config()).unwrap().is_empty());
    }

    #[test]
    fn test_resubmit_mode() {
        let request = capture_request();
        let message =
            CompleteCapture::new(&request, CaptureMode::ResubmitTransaction, timestamp());

        assert_eq!(message.method(), Method::Post);
        assert_eq!(message.path(&config()).unwrap(), "/contract/transaction");

        let payload = message.payload(&config()).unwrap().unwrap();
        assert_eq!(payload["Contract"]["AmountInCents"], 1599);
        assert_eq!(payload["Fulfillment"]["Timestamp"], "2019-03-09T15:04:05Z");
    }

    #[test]
    fn test_resubmit_requires_payment() {
        let request = CaptureRequest { payment: None, ..capture_request() };
        let message =
            CompleteCapture::new(&request, CaptureMode::ResubmitTransaction, timestamp());

        assert!(matches!(message.path(&config()), Err(GatewayError::InvalidInput(_))));
        assert!(matches!(message.payload(&config()), Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn test_capture_requires_reference_in_both_modes() {
        let request = CaptureRequest { transaction_reference: String::new(), ..capture_request() };

        for mode in [CaptureMode::StatusCheck, CaptureMode::ResubmitTransaction] {
            let message = CompleteCapture::new(&request, mode, timestamp());
            assert!(matches!(message.path(&config()), Err(GatewayError::InvalidInput(_))));
        }
    }
}
