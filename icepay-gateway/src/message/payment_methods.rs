//! `GET /paymentmethods?ContractProfileId={id}`.
//!
//! The profile id travels as a query parameter. The request has no body; its
//! payload is only the logical view `{ContractProfileId}`.

use serde_json::{Value, json};
use url::form_urlencoded;

use super::{GatewayMessage, Operation};
use crate::{config::GatewayConfig, error::Result, transport::Method};

/// Payment methods lookup. Everything it needs comes from the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentMethods;

impl GatewayMessage for PaymentMethods {
    fn operation(&self) -> Operation {
        Operation::PaymentMethods
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self, config: &GatewayConfig) -> Result<String> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("ContractProfileId", config.contract_profile_id())
            .finish();
        Ok(format!("/paymentmethods?{query}"))
    }

    fn payload(&self, config: &GatewayConfig) -> Result<Option<Value>> {
        Ok(Some(json!({ "ContractProfileId": config.contract_profile_id() })))
    }
}
