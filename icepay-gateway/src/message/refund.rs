//! `POST /transaction/{reference}/refund`.
//!
//! The payload is flat; the transaction being refunded travels in the path only.

use serde::Serialize;
use serde_json::Value;

use super::{GatewayMessage, Operation, path_segment, request::RefundRequest};
use crate::{config::GatewayConfig, error::Result, transport::Method};

/// Refund body as sent to Icepay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RefundDocument<'a> {
    contract_profile_id: &'a str,
    amount_in_cents: u64,
    currency_code: &'a str,
    reference: &'a str,
}

/// Refund request.
#[derive(Debug, Clone, Copy)]
pub struct Refund<'a> {
    request: &'a RefundRequest,
}

impl<'a> Refund<'a> {
    /// Wraps `request`.
    #[must_use]
    pub const fn new(request: &'a RefundRequest) -> Self {
        Self { request }
    }
}

impl GatewayMessage for Refund<'_> {
    fn operation(&self) -> Operation {
        Operation::Refund
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self, _config: &GatewayConfig) -> Result<String> {
        let reference =
            path_segment("transaction_reference", &self.request.transaction_reference)?;
        Ok(format!("/transaction/{reference}/refund"))
    }

    fn payload(&self, config: &GatewayConfig) -> Result<Option<Value>> {
        let document = RefundDocument {
            contract_profile_id: config.contract_profile_id(),
            amount_in_cents: self.request.amount.get(),
            currency_code: &self.request.currency_code,
            reference: &self.request.reference,
        };
        Ok(Some(serde_json::to_value(document)?))
    }
}
