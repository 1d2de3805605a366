//! Integration tests for the gateway facade.
//!
//! Drives every operation end to end through a recording transport and checks
//! what goes over the wire and how answers are normalized.

use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use icepay_gateway::{
    CaptureMode, Gateway, GatewayConfig, GatewayError, GatewaySettings, Outcome, Result,
    amount::MinorUnits,
    config::{API_BASE_URL, TEST_API_BASE_URL},
    message::{
        CaptureRequest, Consumer, PaymentMethodsRequest, PaymentRequest, RefundRequest,
        StatusRequest, TransactionStatus,
    },
    signer::headers,
    transport::{RequestContext, Transport, TransportResponse},
};
use serde_json::{Value, json};

const PROFILE: &str = "64eb3717-8b5d-4088-8108-93224675e538";
const SECRET: &str = "NjRlYjM3MTctOGI1ZC00MDg4LTgxMDgtOTMyMjQ2NzVlNTM4";

const VALIDATION_ERROR: &str = r#"[{
    "Error": {
        "Code": "RequestModelValidationFailed",
        "Description": "Invalid request model",
        "Parameters": [{ "Name": "contractProfileId", "Value": "The value 'X' is not valid." }]
    },
    "ErrorAt": null,
    "Description": "contractProfileId = The value 'X' is not valid. ;"
}]"#;

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: &'static str,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RecordedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Answers every call with one canned response and records what was sent.
#[derive(Debug)]
struct RecordingTransport {
    status: u16,
    body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into(), requests: Mutex::new(Vec::new()) }
    }

    fn record(
        &self,
        method: &'static str,
        ctx: &RequestContext<'_>,
        body: &[u8],
    ) -> TransportResponse {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: format!("{}{}", ctx.base_url, ctx.path),
            headers: ctx.headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
            body: body.to_vec(),
        });
        TransportResponse {
            status: self.status,
            body: self.body.clone().into_bytes(),
            headers: vec![],
        }
    }

    fn last(&self) -> RecordedRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    async fn get<'a>(&'a self, ctx: RequestContext<'a>) -> Result<TransportResponse> {
        Ok(self.record("GET", &ctx, &[]))
    }

    async fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        Ok(self.record("POST", &ctx, body))
    }

    fn protocol_name(&self) -> &'static str {
        "recording"
    }
}

fn gateway(status: u16, body: &str) -> Gateway<RecordingTransport> {
    Gateway::with_transport(
        GatewayConfig::new(PROFILE, SECRET, true),
        RecordingTransport::new(status, body),
    )
}

fn payment(amount: u64) -> PaymentRequest {
    PaymentRequest {
        amount: MinorUnits::new(amount),
        currency_code: "EUR".to_owned(),
        transaction_id: "e8ca7e34-5c41-4bd8-8e2c-e6fc5d0fb1a4".to_owned(),
        reference: Some("829c7998-6497-402c-a049-51801ba33662".to_owned()),
        return_url: Some("https://www.superbrave.nl/return-url".to_owned()),
        cancel_url: Some("https://www.superbrave.nl/cancel-url".to_owned()),
        notify_url: Some("https://www.superbrave.nl/notify-url".to_owned()),
        payment_method: Some("IDEAL".to_owned()),
        issuer_code: Some("ABNAMRO".to_owned()),
        language_code: Some("nl".to_owned()),
        country_code: Some("NL".to_owned()),
        description: Some("Test".to_owned()),
        timestamp: Some(Utc.with_ymd_and_hms(2019, 3, 9, 15, 4, 5).unwrap()),
        consumer: None,
    }
}

#[tokio::test]
async fn test_create_transaction_amounts_are_exact() {
    for amount in [0, 1, 1599, 99_999_999, u64::MAX] {
        let gateway = gateway(200, "{}");
        gateway.create_payment(&payment(amount)).await.unwrap();

        let sent = gateway.transport().last().json();
        assert_eq!(sent["Contract"]["AmountInCents"].as_u64(), Some(amount));
        assert_eq!(sent["Fulfillment"]["AmountInCents"].as_u64(), Some(amount));
    }
}

#[tokio::test]
async fn test_create_transaction_wire_format() {
    let gateway = gateway(
        200,
        r#"{"contractId":"c-1","transactionId":"t-1","status":"STARTED","acceptanceUrl":"https://acc-checkout.icepay.com/t-1"}"#,
    );

    let response = gateway.authorize(&payment(1337)).await.unwrap();
    assert_eq!(response.outcome(), Outcome::Successful);
    assert_eq!(response.contract_id(), Some("c-1"));
    assert_eq!(response.redirect_url(), Some("https://acc-checkout.icepay.com/t-1"));

    let sent = gateway.transport().last();
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.url, "https://acc-interconnect.icepay.com/api/contract/transaction");
    assert_eq!(sent.header(headers::USER_ID), Some(PROFILE));
    assert_eq!(sent.header(headers::TIMESTAMP), Some("2019-03-09T15:04:05Z"));
    assert!(sent.header(headers::CHECKSUM).is_some_and(|c| !c.is_empty()));

    let body = sent.json();
    assert_eq!(body["Postback"]["UrlsNotify"], json!(["https://www.superbrave.nl/notify-url"]));
    assert_eq!(
        body["IntegratorFootprint"],
        json!({ "IPAddress": "127.0.0.1", "TimeStampUTC": "0" })
    );
    assert_eq!(body["Fulfillment"]["Order"]["OrderNumber"], "829c7998-6497-402c-a049-51801ba33662");
}

#[tokio::test]
async fn test_success_predicate() {
    let both = gateway(200, r#"{"contractId":"c","transactionId":"t"}"#);
    assert!(both.create_payment(&payment(1)).await.unwrap().is_successful());

    let no_transaction = gateway(200, r#"{"contractId":"c"}"#);
    assert!(!no_transaction.create_payment(&payment(1)).await.unwrap().is_successful());

    let no_contract = gateway(200, r#"{"transactionId":"t"}"#);
    assert!(!no_contract.create_payment(&payment(1)).await.unwrap().is_successful());
}

#[tokio::test]
async fn test_error_envelope_message() {
    let gateway = gateway(400, VALIDATION_ERROR);
    let response = gateway.create_payment(&payment(1)).await.unwrap();

    assert_eq!(response.outcome(), Outcome::Failed);
    assert_eq!(response.message(), "contractProfileId = The value 'X' is not valid. ;");
    let errors = response.errors();
    let detail = errors[0].error.as_ref().unwrap();
    assert_eq!(detail.code.as_deref(), Some("RequestModelValidationFailed"));
}

#[tokio::test]
async fn test_unknown_error_message() {
    let gateway = gateway(500, r#"{"unexpected":"shape"}"#);
    let response = gateway.create_payment(&payment(1)).await.unwrap();

    assert_eq!(response.outcome(), Outcome::Failed);
    assert_eq!(response.message(), "Unknown Error");
}

#[tokio::test]
async fn test_refund_wire_format() {
    let gateway = gateway(200, r#"{"contractId":"c","transactionId":"t-2"}"#);
    let request = RefundRequest {
        transaction_reference: "1M-MR-M33533K5-L00K-47-M3".to_owned(),
        amount: MinorUnits::new(1599),
        currency_code: "EUR".to_owned(),
        reference: "1N-4-B1G-B1G-W0RLD".to_owned(),
        timestamp: None,
    };

    let response = gateway.refund_payment(&request).await.unwrap();
    assert!(response.is_successful());

    let sent = gateway.transport().last();
    assert_eq!(sent.method, "POST");
    assert_eq!(
        sent.url,
        "https://acc-interconnect.icepay.com/api/transaction/1M-MR-M33533K5-L00K-47-M3/refund"
    );
    assert_eq!(
        sent.json(),
        json!({
            "ContractProfileId": PROFILE,
            "AmountInCents": 1599,
            "CurrencyCode": "EUR",
            "Reference": "1N-4-B1G-B1G-W0RLD"
        })
    );
}

#[tokio::test]
async fn test_payment_methods_wire_format() {
    let gateway = gateway(200, r#"{"paymentMethods":[{"code":"IDEAL"},{"code":"CREDITCARD"}]}"#);
    let response = gateway.fetch_payment_methods(&PaymentMethodsRequest::default()).await.unwrap();

    assert_eq!(response.outcome(), Outcome::Successful);
    assert_eq!(response.payment_methods().unwrap().len(), 2);

    let sent = gateway.transport().last();
    assert_eq!(sent.method, "GET");
    assert_eq!(
        sent.url,
        format!("https://acc-interconnect.icepay.com/api/paymentmethods?ContractProfileId={PROFILE}")
    );
    assert!(sent.body.is_empty());
}

#[tokio::test]
async fn test_payment_methods_status_400_fails() {
    let gateway = gateway(400, VALIDATION_ERROR);
    let response = gateway.list_payment_methods(&PaymentMethodsRequest::default()).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.outcome(), Outcome::Failed);
    assert_eq!(response.message(), "contractProfileId = The value 'X' is not valid. ;");

    let with_methods = self::gateway(400, r#"{"paymentMethods":[]}"#);
    let response =
        with_methods.list_payment_methods(&PaymentMethodsRequest::default()).await.unwrap();
    assert!(!response.is_successful());
}

#[tokio::test]
async fn test_consumer_category() {
    let gateway = gateway(200, "{}");

    let company = PaymentRequest {
        consumer: Some(Consumer { company: Some("Superbrave".to_owned()), ..Default::default() }),
        ..payment(1)
    };
    gateway.create_payment(&company).await.unwrap();
    assert_eq!(gateway.transport().last().json()["Fulfillment"]["Consumer"]["Category"], "Company");

    let person = PaymentRequest {
        consumer: Some(Consumer { first_name: Some("Rick".to_owned()), ..Default::default() }),
        ..payment(1)
    };
    gateway.create_payment(&person).await.unwrap();
    assert_eq!(gateway.transport().last().json()["Fulfillment"]["Consumer"]["Category"], "Person");
}

#[test]
fn test_environment_selection() {
    assert_eq!(GatewayConfig::new(PROFILE, SECRET, true).base_url(), TEST_API_BASE_URL);
    assert_eq!(GatewayConfig::new(PROFILE, SECRET, false).base_url(), API_BASE_URL);
    assert_eq!(GatewayConfig::new("other", "", false).base_url(), API_BASE_URL);
}

#[tokio::test]
async fn test_live_mode_uses_production_url() {
    let gateway = Gateway::with_transport(
        GatewayConfig::new(PROFILE, SECRET, false),
        RecordingTransport::new(200, "{}"),
    );
    gateway.check_status(&StatusRequest::new("t-1")).await.unwrap();

    assert_eq!(
        gateway.transport().last().url,
        "https://interconnect.icepay.com/api/transaction/t-1"
    );
}

#[tokio::test]
async fn test_status_lifecycle() {
    let pending = gateway(200, r#"{"status":"PENDING"}"#);
    let response = pending.check_status(&StatusRequest::new("t-1")).await.unwrap();
    assert_eq!(response.outcome(), Outcome::Pending);

    let settled = gateway(200, r#"{"contractId":"c","transactionId":"t-1","status":"SETTLED"}"#);
    let response = settled.check_status(&StatusRequest::new("t-1")).await.unwrap();
    assert_eq!(response.outcome(), Outcome::Successful);
    assert_eq!(response.transaction_status(), Some(TransactionStatus::Settled));

    let cancelled = gateway(400, r#"[{"ErrorAt":"Consumer","Description":"Cancelled"}]"#);
    let response = cancelled.check_status(&StatusRequest::new("t-1")).await.unwrap();
    assert_eq!(response.outcome(), Outcome::Cancelled);
    assert!(response.is_cancelled());
}

#[tokio::test]
async fn test_capture_modes_from_settings() {
    let settings = GatewaySettings::from_toml(&format!(
        r#"
            contract_profile_id = "{PROFILE}"
            secret_key = "{SECRET}"
            test_mode = true
            capture_mode = "resubmit_transaction"
        "#
    ))
    .unwrap();
    let config = settings.gateway_config();
    assert_eq!(config.capture_mode(), CaptureMode::ResubmitTransaction);

    let gateway = Gateway::with_transport(config, RecordingTransport::new(200, "{}"));
    let request = CaptureRequest {
        transaction_reference: "t-1".to_owned(),
        payment: Some(payment(1599)),
        timestamp: None,
    };
    gateway.capture(&request).await.unwrap();
    let sent = gateway.transport().last();
    assert_eq!(sent.method, "POST");
    assert!(sent.url.ends_with("/contract/transaction"));
    assert_eq!(sent.json()["Contract"]["AmountInCents"], 1599);

    let gateway = self::gateway(200, "{}");
    gateway.capture(&request).await.unwrap();
    let sent = gateway.transport().last();
    assert_eq!(sent.method, "GET");
    assert!(sent.url.ends_with("/transaction/t-1"));
}

#[tokio::test]
async fn test_missing_reference_is_rejected_before_sending() {
    let gateway = gateway(200, "{}");

    let refund = RefundRequest { currency_code: "EUR".to_owned(), ..Default::default() };
    assert!(matches!(gateway.refund(&refund).await, Err(GatewayError::InvalidInput(_))));

    let status = StatusRequest::new("");
    assert!(matches!(gateway.check_status(&status).await, Err(GatewayError::InvalidInput(_))));

    let capture = CaptureRequest::default();
    assert!(matches!(gateway.complete_capture(&capture).await, Err(GatewayError::InvalidInput(_))));

    assert_eq!(gateway.transport().count(), 0);
}

#[tokio::test]
async fn test_references_outside_unreserved_set_are_rejected_before_sending() {
    let gateway = gateway(200, "{}");

    for reference in ["té\"1", "50%", "{id}", "..", "a..b"] {
        let status = StatusRequest::new(reference);
        let result = gateway.check_status(&status).await;
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))), "{reference:?}");

        let refund = RefundRequest {
            transaction_reference: reference.to_owned(),
            currency_code: "EUR".to_owned(),
            ..Default::default()
        };
        assert!(matches!(gateway.refund(&refund).await, Err(GatewayError::InvalidInput(_))));
    }

    assert_eq!(gateway.transport().count(), 0);
}

#[tokio::test]
async fn test_each_call_is_signed_afresh() {
    let gateway = gateway(200, "{}");
    let first = StatusRequest {
        transaction_reference: "t-1".to_owned(),
        timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
    };
    let second = StatusRequest {
        timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap()),
        ..first.clone()
    };

    gateway.check_status(&first).await.unwrap();
    let a = gateway.transport().last();
    gateway.check_status(&second).await.unwrap();
    let b = gateway.transport().last();

    assert_ne!(a.header(headers::CHECKSUM), b.header(headers::CHECKSUM));
    assert_eq!(b.header(headers::TIMESTAMP), Some("2024-01-01T00:00:01Z"));
}
