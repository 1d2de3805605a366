//! `POST /contract/transaction`.
//!
//! Builds the nested create-transaction document: contract, postback URLs,
//! footprints and fulfillment (order and optional consumer).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{GatewayMessage, Operation, format_timestamp, request::PaymentRequest};
use crate::{config::GatewayConfig, error::Result, transport::Method};

/// Endpoint path.
pub const PATH: &str = "/contract/transaction";

/// Footprint IP sent for both integrator and consumer.
const FOOTPRINT_IP: &str = "127.0.0.1";

/// Footprint timestamp sent for both integrator and consumer.
const FOOTPRINT_TIMESTAMP: &str = "0";

/// Create-transaction request.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use icepay_gateway::{
///     amount::MinorUnits,
///     config::GatewayConfig,
///     message::{CreateTransaction, GatewayMessage, PaymentRequest},
/// };
///
/// let config = GatewayConfig::new("profile", "c2VjcmV0", true);
/// let request = PaymentRequest {
///     amount: MinorUnits::new(1599),
///     currency_code: "EUR".to_owned(),
///     transaction_id: "order-1234".to_owned(),
///     ..Default::default()
/// };
/// let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
///
/// let payload = CreateTransaction::new(&request, timestamp).payload(&config).unwrap().unwrap();
/// assert_eq!(payload["Contract"]["AmountInCents"], 1599);
/// assert_eq!(payload["Fulfillment"]["Timestamp"], "2024-01-01T00:00:00Z");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CreateTransaction<'a> {
    request: &'a PaymentRequest,
    timestamp: DateTime<Utc>,
}

impl<'a> CreateTransaction<'a> {
    /// Wraps `request`, stamped with `timestamp`.
    #[must_use]
    pub const fn new(request: &'a PaymentRequest, timestamp: DateTime<Utc>) -> Self {
        Self { request, timestamp }
    }

    /// Builds the typed document.
    #[must_use]
    pub fn document<'b>(&'b self, config: &'b GatewayConfig) -> TransactionDocument<'b> {
        let request = self.request;
        let amount = request.amount.get();
        let currency_code = request.currency_code.as_str();

        TransactionDocument {
            contract: Contract {
                contract_profile_id: config.contract_profile_id(),
                amount_in_cents: amount,
                currency_code,
                reference: &request.transaction_id,
            },
            postback: Postback {
                url_completed: request.return_url.as_deref(),
                url_error: request.cancel_url.as_deref(),
                urls_notify: vec![request.notify_url.as_deref()],
            },
            integrator_footprint: Footprint::local(),
            consumer_footprint: Footprint::local(),
            fulfillment: Fulfillment {
                payment_method: request.payment_method.as_deref(),
                issuer_code: request.issuer_code.as_deref(),
                amount_in_cents: amount,
                currency_code,
                timestamp: format_timestamp(&self.timestamp),
                language_code: request.language_code.as_deref(),
                country_code: request.country_code.as_deref(),
                reference: &request.transaction_id,
                order: Order {
                    order_number: request.reference.as_deref(),
                    currency_code,
                    total_gross_amount_cents: amount,
                    total_net_amount_cents: amount,
                },
                description: request.description.as_deref(),
                consumer: request.consumer.as_ref().map(|consumer| {
                    let address = consumer.address.as_ref();
                    ConsumerDocument {
                        address: AddressDocument {
                            country_code: address.and_then(|a| a.country_code.as_deref()),
                            city: address.and_then(|a| a.city.as_deref()),
                            postal_code: address.and_then(|a| a.postal_code.as_deref()),
                            street: address.and_then(|a| a.street.as_deref()),
                        },
                        first_name: consumer.first_name.as_deref(),
                        last_name: consumer.last_name.as_deref(),
                        email: consumer.email.as_deref(),
                        phone: consumer.phone.as_deref(),
                        category: if consumer.is_company() {
                            ConsumerCategory::Company
                        } else {
                            ConsumerCategory::Person
                        },
                    }
                }),
            },
        }
    }
}

impl GatewayMessage for CreateTransaction<'_> {
    fn operation(&self) -> Operation {
        Operation::CreateTransaction
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self, _config: &GatewayConfig) -> Result<String> {
        Ok(PATH.to_owned())
    }

    fn payload(&self, config: &GatewayConfig) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(self.document(config))?))
    }
}

/// Create-transaction body as sent to Icepay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionDocument<'a> {
    contract: Contract<'a>,
    postback: Postback<'a>,
    integrator_footprint: Footprint,
    consumer_footprint: Footprint,
    fulfillment: Fulfillment<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Contract<'a> {
    contract_profile_id: &'a str,
    amount_in_cents: u64,
    currency_code: &'a str,
    reference: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Postback<'a> {
    url_completed: Option<&'a str>,
    url_error: Option<&'a str>,
    urls_notify: Vec<Option<&'a str>>,
}

#[derive(Debug, Serialize)]
struct Footprint {
    #[serde(rename = "IPAddress")]
    ip_address: &'static str,
    #[serde(rename = "TimeStampUTC")]
    timestamp_utc: &'static str,
}

impl Footprint {
    const fn local() -> Self {
        Self { ip_address: FOOTPRINT_IP, timestamp_utc: FOOTPRINT_TIMESTAMP }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Fulfillment<'a> {
    payment_method: Option<&'a str>,
    issuer_code: Option<&'a str>,
    amount_in_cents: u64,
    currency_code: &'a str,
    timestamp: String,
    language_code: Option<&'a str>,
    country_code: Option<&'a str>,
    reference: &'a str,
    order: Order<'a>,
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consumer: Option<ConsumerDocument<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Order<'a> {
    order_number: Option<&'a str>,
    currency_code: &'a str,
    total_gross_amount_cents: u64,
    total_net_amount_cents: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConsumerDocument<'a> {
    address: AddressDocument<'a>,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    category: ConsumerCategory,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AddressDocument<'a> {
    country_code: Option<&'a str>,
    city: Option<&'a str>,
    postal_code: Option<&'a str>,
    street: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum ConsumerCategory {
    Company,
    Person,
}
