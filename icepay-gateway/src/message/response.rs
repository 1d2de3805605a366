//! Normalized responses.
//!
//! Parsing is best effort and never fails: a body that is empty or not JSON
//! becomes [`Value::Null`], and a missing field degrades to a default rather
//! than an error. The HTTP status only matters for the payment-methods
//! lookup; transaction operations are judged on the body alone.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::Operation;
use crate::transport::TransportResponse;

/// Message reported when the body carries no error description.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

/// Normalized result of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The processor accepted the request.
    Successful,
    /// The transaction exists but has not reached a final state.
    Pending,
    /// The consumer cancelled, as far as can be told.
    Cancelled,
    /// Validation, business-rule or processing failure.
    Failed,
}

impl Outcome {
    /// Lower-case name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction state as reported by Icepay in `status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    /// Cancelled by the consumer.
    Cancelled,
    /// Chargeback requested by the consumer (`CBACK`).
    Chargeback,
    /// Cleared by the payment system; funds not yet received by Icepay.
    Completed,
    /// Not completed by the consumer in time.
    Expired,
    /// Failed for technical reasons.
    Failed,
    /// Initiated by the consumer.
    Pending,
    /// Refund initiated by the merchant.
    Refund,
    /// Failed for functional reasons.
    Rejected,
    /// Funds received by Icepay and reconciled.
    Settled,
    /// Payment process started by the consumer.
    Started,
    /// Any status not listed above, kept verbatim.
    Unknown(String),
}

impl TransactionStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::Chargeback => "CBACK",
            Self::Completed => "COMPLETED",
            Self::Expired => "EXPIRED",
            Self::Failed => "FAILED",
            Self::Pending => "PENDING",
            Self::Refund => "REFUND",
            Self::Rejected => "REJECTED",
            Self::Settled => "SETTLED",
            Self::Started => "STARTED",
            Self::Unknown(status) => status,
        }
    }

    /// True while the consumer has yet to finish paying.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Started)
    }
}

impl From<&str> for TransactionStatus {
    fn from(status: &str) -> Self {
        match status {
            "CANCELLED" => Self::Cancelled,
            "CBACK" => Self::Chargeback,
            "COMPLETED" => Self::Completed,
            "EXPIRED" => Self::Expired,
            "FAILED" => Self::Failed,
            "PENDING" => Self::Pending,
            "REFUND" => Self::Refund,
            "REJECTED" => Self::Rejected,
            "SETTLED" => Self::Settled,
            "STARTED" => Self::Started,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the error array Icepay returns on failure.
///
/// ```json
/// [{
///   "Error": {
///     "Code": "RequestModelValidationFailed",
///     "Description": "Invalid request model",
///     "Parameters": [{ "Name": "contractProfileId", "Value": "The value 'X' is not valid." }]
///   },
///   "ErrorAt": null,
///   "Description": "contractProfileId = The value 'X' is not valid. ;"
/// }]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEnvelope {
    /// Structured error.
    #[serde(default)]
    pub error: Option<ErrorDetail>,
    /// Where the error occurred; usually null.
    #[serde(default)]
    pub error_at: Option<Value>,
    /// Human-readable summary.
    #[serde(default)]
    pub description: Option<String>,
}

/// Structured part of an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `RequestModelValidationFailed`.
    #[serde(default)]
    pub code: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Offending request parameters.
    #[serde(default)]
    pub parameters: Vec<ErrorParameter>,
}

/// A request parameter named in an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorParameter {
    /// Parameter name.
    #[serde(default)]
    pub name: Option<String>,
    /// What was wrong with it.
    #[serde(default)]
    pub value: Option<Value>,
}

/// Detects a consumer cancellation from an undocumented error shape.
///
/// Icepay has no documented cancellation signal. When a consumer cancels while
/// the status is delayed, the body is an error array whose first element has
/// both a non-null `ErrorAt` and a non-null `Description`. This is a heuristic
/// and the only place it is encoded.
#[must_use]
pub fn is_undocumented_cancellation(data: &Value) -> bool {
    data.as_array()
        .and_then(|items| items.first())
        .is_some_and(|first| is_set(first, "ErrorAt") && is_set(first, "Description"))
}

/// Present and not null.
fn is_set(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(|field| !field.is_null())
}

/// Parses a response body, falling back to `Value::Null`.
fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, body_len = body.len(), "response body is not JSON");
        Value::Null
    })
}

/// Normalized response of one operation.
///
/// Immutable once built. The parsed body stays available through
/// [`data`](Self::data).
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    operation: Operation,
    outcome: Outcome,
    status_code: u16,
    data: Value,
}

impl GatewayResponse {
    /// Parses a raw transport response for `operation`.
    #[must_use]
    pub fn parse(operation: Operation, response: &TransportResponse) -> Self {
        Self::from_parts(operation, response.status, parse_body(&response.body))
    }

    /// Builds a response from an already parsed body.
    ///
    /// # Examples
    ///
    /// ```
    /// use icepay_gateway::message::{GatewayResponse, Operation, Outcome};
    /// use serde_json::json;
    ///
    /// let response = GatewayResponse::from_parts(
    ///     Operation::CreateTransaction,
    ///     200,
    ///     json!({ "contractId": "c-1", "transactionId": "t-1", "status": "STARTED" }),
    /// );
    /// assert_eq!(response.outcome(), Outcome::Successful);
    /// assert_eq!(response.transaction_reference(), Some("t-1"));
    /// ```
    #[must_use]
    pub fn from_parts(operation: Operation, status_code: u16, data: Value) -> Self {
        let outcome = if is_undocumented_cancellation(&data) {
            Outcome::Cancelled
        } else if is_success(operation, status_code, &data) {
            Outcome::Successful
        } else if operation.is_transaction()
            && status_of(&data).is_some_and(|status| status.is_in_flight())
        {
            Outcome::Pending
        } else {
            Outcome::Failed
        };

        Self { operation, outcome, status_code, data }
    }

    /// Operation this response answers.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Normalized outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Parsed body; `Value::Null` if it was empty or not JSON.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// The success predicate.
    ///
    /// Transaction operations: both `contractId` and `transactionId` present.
    /// Payment methods: HTTP 200 and a `paymentMethods` array.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        is_success(self.operation, self.status_code, &self.data)
    }

    /// See [`is_undocumented_cancellation`].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        is_undocumented_cancellation(&self.data)
    }

    /// True when the outcome is [`Outcome::Pending`].
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.outcome == Outcome::Pending
    }

    /// Processor-assigned transaction reference (`transactionId`).
    #[must_use]
    pub fn transaction_reference(&self) -> Option<&str> {
        self.data.get("transactionId").and_then(Value::as_str)
    }

    /// Contract identifier (`contractId`).
    #[must_use]
    pub fn contract_id(&self) -> Option<&str> {
        self.data.get("contractId").and_then(Value::as_str)
    }

    /// Description of the first error, or [`UNKNOWN_ERROR`].
    #[must_use]
    pub fn message(&self) -> &str {
        self.data
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get("Description"))
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR)
    }

    /// Transaction status reported in `status`, if any.
    #[must_use]
    pub fn transaction_status(&self) -> Option<TransactionStatus> {
        status_of(&self.data)
    }

    /// Where to send the consumer to pay (`acceptanceUrl`).
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        self.data.get("acceptanceUrl").and_then(Value::as_str)
    }

    /// Enabled payment methods, for a successful lookup.
    #[must_use]
    pub fn payment_methods(&self) -> Option<&[Value]> {
        if self.operation != Operation::PaymentMethods || !self.is_successful() {
            return None;
        }
        self.data.get("paymentMethods").and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Error entries, when the body is an error array.
    ///
    /// Entries that do not match the envelope shape are skipped.
    #[must_use]
    pub fn errors(&self) -> Vec<ErrorEnvelope> {
        self.data
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| ErrorEnvelope::deserialize(item).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn is_success(operation: Operation, status_code: u16, data: &Value) -> bool {
    if operation.is_transaction() {
        is_set(data, "contractId") && is_set(data, "transactionId")
    } else {
        status_code == 200 && data.get("paymentMethods").is_some_and(Value::is_array)
    }
}

fn status_of(data: &Value) -> Option<TransactionStatus> {
    data.get("status").and_then(Value::as_str).map(TransactionStatus::from)
}
