//! Icepay Gateway: Interconnect API adapter
//!
//! Maps a generic payment model (create, capture, refund, status lookup,
//! payment methods) onto the Icepay Interconnect REST API and maps the
//! processor's JSON answers back onto a normalized [`GatewayResponse`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   PaymentRequest, RefundRequest, ...
//! │   Caller     │
//! └──────┬───────┘
//!        │
//! ┌──────▼──────────────────────────────────────────────┐
//! │ Gateway                                              │
//! │  message (build) ─► signer (HMAC) ─► transport (send)│
//! │                  ◄─ response (parse) ◄───────────────│
//! └──────┬───────────────────────────────────────────────┘
//!        │ HTTPS + USERID / TIMESTAMP / CHECKSUM
//! ┌──────▼───────┐
//! │ Icepay API   │  interconnect.icepay.com / acc-interconnect.icepay.com
//! └──────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use icepay_gateway::{
//!     Gateway, GatewayConfig, Outcome,
//!     amount::MinorUnits,
//!     message::{PaymentRequest, StatusRequest},
//! };
//!
//! # async fn example() -> icepay_gateway::Result<()> {
//! let config = GatewayConfig::new("64eb3717-8b5d-4088-8108-93224675e538", "c2VjcmV0", true);
//! let gateway = Gateway::new(config)?;
//!
//! let payment = PaymentRequest {
//!     amount: MinorUnits::new(1599),
//!     currency_code: "EUR".to_owned(),
//!     transaction_id: "order-1234".to_owned(),
//!     payment_method: Some("IDEAL".to_owned()),
//!     return_url: Some("https://shop.example.com/return".to_owned()),
//!     cancel_url: Some("https://shop.example.com/cancel".to_owned()),
//!     notify_url: Some("https://shop.example.com/notify".to_owned()),
//!     ..Default::default()
//! };
//!
//! let created = gateway.create_payment(&payment).await?;
//! match created.outcome() {
//!     Outcome::Successful => println!("pay at {:?}", created.redirect_url()),
//!     _ => eprintln!("rejected: {}", created.message()),
//! }
//!
//! if let Some(reference) = created.transaction_reference() {
//!     let status = gateway.check_status(&StatusRequest::new(reference)).await?;
//!     println!("status: {:?}", status.transaction_status());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`config`]: credentials, environment selection, TOML settings
//! - [`signer`]: HMAC-SHA256 request checksums
//! - [`message`]: request builders and response parsing
//! - [`transport`]: transport abstraction and the `reqwest` implementation
//! - [`gateway`]: the facade composing all of the above
//! - [`amount`]: integer minor-unit amounts
//! - [`error`]: error types
//!
//! # Error Handling
//!
//! Only failures to talk to Icepay, or requests that cannot be built, are
//! errors. A rejection by Icepay is a response with [`Outcome::Failed`] and a
//! [`message`](GatewayResponse::message).
//!
//! ```rust
//! use icepay_gateway::{GatewayError, message::{GatewayResponse, Operation, Outcome}};
//! use serde_json::json;
//!
//! let response = GatewayResponse::from_parts(
//!     Operation::CreateTransaction,
//!     400,
//!     json!([{ "ErrorAt": null, "Description": "contractProfileId = The value 'X' is not valid. ;" }]),
//! );
//! assert_eq!(response.outcome(), Outcome::Failed);
//! assert_eq!(response.message(), "contractProfileId = The value 'X' is not valid. ;");
//!
//! let error = GatewayError::InvalidInput("transaction_reference must not be empty".to_owned());
//! assert!(error.to_string().contains("transaction_reference"));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and ring"
)]

pub mod amount;
pub mod config;
pub mod error;
pub mod gateway;
pub mod message;
pub mod signer;
pub mod transport;

pub use config::{CaptureMode, GatewayConfig, GatewaySettings};
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use message::{GatewayResponse, Operation, Outcome, TransactionStatus};
