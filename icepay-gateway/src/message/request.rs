//! Generic request model.
//!
//! These types carry what the caller knows about a payment. They are built per
//! call, never persisted, and hold amounts only as [`MinorUnits`].

use chrono::{DateTime, Utc};

use crate::amount::MinorUnits;

/// A payment to create (or re-submit for capture).
///
/// # Examples
///
/// ```
/// use icepay_gateway::{amount::MinorUnits, message::PaymentRequest};
///
/// let request = PaymentRequest {
///     amount: MinorUnits::new(1599),
///     currency_code: "EUR".to_owned(),
///     transaction_id: "order-1234".to_owned(),
///     payment_method: Some("IDEAL".to_owned()),
///     ..Default::default()
/// };
/// assert_eq!(request.amount.get(), 1599);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Merchant reference for the transaction (`Contract.Reference`).
    pub transaction_id: String,
    /// Merchant order number (`Order.OrderNumber`).
    pub reference: Option<String>,
    /// Where the consumer lands after a completed payment.
    pub return_url: Option<String>,
    /// Where the consumer lands after an error or cancellation.
    pub cancel_url: Option<String>,
    /// Postback URL for status notifications.
    pub notify_url: Option<String>,
    /// Icepay payment method code, e.g. `IDEAL`.
    pub payment_method: Option<String>,
    /// Issuer code, e.g. the consumer's bank.
    pub issuer_code: Option<String>,
    /// ISO 639-1 language code.
    pub language_code: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: Option<String>,
    /// Description shown to the consumer.
    pub description: Option<String>,
    /// Explicit timestamp; the gateway stamps the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
    /// Consumer details, sent as `Fulfillment.Consumer` when present.
    pub consumer: Option<Consumer>,
}

/// The paying consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Consumer {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// E-mail address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Company name, for business consumers.
    pub company: Option<String>,
    /// Billing address.
    pub address: Option<Address>,
}

impl Consumer {
    /// True when a non-empty company name is set.
    #[must_use]
    pub fn is_company(&self) -> bool {
        self.company.as_deref().is_some_and(|company| !company.is_empty())
    }
}

/// Billing address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Street and house number.
    pub street: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: Option<String>,
}

/// Completes an authorized transaction.
///
/// How the call is made depends on [`CaptureMode`](crate::config::CaptureMode):
/// a status lookup needs only the reference, a re-submission also needs the
/// original `payment`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Processor-assigned transaction reference.
    pub transaction_reference: String,
    /// Original payment, required when re-submitting.
    pub payment: Option<PaymentRequest>,
    /// Explicit timestamp; the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Refunds (part of) a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefundRequest {
    /// Processor-assigned reference of the transaction being refunded.
    pub transaction_reference: String,
    /// Amount to refund, in minor units.
    pub amount: MinorUnits,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Merchant reference for the refund.
    pub reference: String,
    /// Explicit timestamp; the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Looks up a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRequest {
    /// Processor-assigned transaction reference.
    pub transaction_reference: String,
    /// Explicit timestamp; the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl StatusRequest {
    /// Status request for `transaction_reference`, stamped at call time.
    #[must_use]
    pub fn new(transaction_reference: impl Into<String>) -> Self {
        Self { transaction_reference: transaction_reference.into(), timestamp: None }
    }
}

/// Lists the payment methods of the configured profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentMethodsRequest {
    /// Explicit timestamp; the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}
