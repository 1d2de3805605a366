//! End-to-end payment flow against the Icepay acceptance environment.
//!
//! Lists the enabled payment methods, creates an iDEAL transaction and looks
//! it up again.
//!
//! # Running this example
//!
//! Either point at a settings file:
//!
//! ```bash
//! cargo run --example payment_flow -- icepay.toml
//! ```
//!
//! ```toml
//! contract_profile_id = "64eb3717-8b5d-4088-8108-93224675e538"
//! secret_key = "..."
//! test_mode = true
//! ```
//!
//! or export `ICEPAY_CONTRACT_PROFILE_ID` and `ICEPAY_SECRET_KEY`.
//!
//! Logging follows `RUST_LOG` (default `info`); set `LOG_FORMAT=json` for
//! structured output.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::uninlined_format_args,
    clippy::use_debug,
    reason = "examples are allowed to use println and simple formatting"
)]

use std::{env, io};

use icepay_gateway::{
    Gateway, GatewayConfig, GatewaySettings, Outcome,
    amount::MinorUnits,
    message::{PaymentMethodsRequest, PaymentRequest, StatusRequest},
};
use rust_decimal::Decimal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if env::var("LOG_FORMAT").unwrap_or_default().eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json().with_current_span(true).with_writer(io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_target(true).with_writer(io::stderr)).init();
    }
}

fn load_gateway() -> Result<Gateway, Box<dyn std::error::Error>> {
    if let Some(path) = env::args().nth(1) {
        let settings = GatewaySettings::from_file(path)?;
        return Ok(Gateway::from_settings(&settings)?);
    }

    let profile = env::var("ICEPAY_CONTRACT_PROFILE_ID")
        .map_err(|_| "pass a settings file or set ICEPAY_CONTRACT_PROFILE_ID")?;
    let secret = env::var("ICEPAY_SECRET_KEY").map_err(|_| "ICEPAY_SECRET_KEY is not set")?;

    Ok(Gateway::new(GatewayConfig::new(profile, secret, true))?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let gateway = load_gateway()?;
    println!("{} ({})", gateway.name(), gateway.config().base_url());

    let methods = gateway.list_payment_methods(&PaymentMethodsRequest::default()).await?;
    match methods.payment_methods() {
        Some(methods) => println!("{} payment methods enabled", methods.len()),
        None => eprintln!("payment methods unavailable: {}", methods.message()),
    }

    let payment = PaymentRequest {
        amount: MinorUnits::from_decimal(Decimal::new(1599, 2), 2)?,
        currency_code: "EUR".to_owned(),
        transaction_id: format!("demo-{}", chrono::Utc::now().timestamp()),
        reference: Some("demo-order".to_owned()),
        return_url: Some("https://shop.example.com/return".to_owned()),
        cancel_url: Some("https://shop.example.com/cancel".to_owned()),
        notify_url: Some("https://shop.example.com/notify".to_owned()),
        payment_method: Some("IDEAL".to_owned()),
        issuer_code: Some("ABNAMRO".to_owned()),
        language_code: Some("nl".to_owned()),
        country_code: Some("NL".to_owned()),
        description: Some("Demo order".to_owned()),
        ..Default::default()
    };

    let created = gateway.create_payment(&payment).await?;
    if created.outcome() != Outcome::Successful {
        eprintln!("create transaction {}: {}", created.outcome(), created.message());
        return Ok(());
    }

    println!("pay at: {:?}", created.redirect_url());

    if let Some(reference) = created.transaction_reference() {
        let status = gateway.check_status(&StatusRequest::new(reference)).await?;
        println!("{} -> {} ({:?})", reference, status.outcome(), status.transaction_status());
    }

    Ok(())
}
