//! Request checksums for the Icepay Interconnect API.
//!
//! Every call carries three authentication headers: the merchant profile id,
//! the timestamp the request was stamped with, and an HMAC-SHA256 checksum
//! over the canonical request. Because the timestamp is part of the signed
//! material, a signature is computed per call and never reused.
//!
//! Canonical message, concatenated without separators:
//!
//! ```text
//! METHOD + base_url + path + contract_profile_id + timestamp + body
//! ```
//!
//! The key is the base64-decoded secret; a secret that is not valid base64 is
//! used as raw bytes. An empty secret signs with an empty key: presence of
//! credentials is the caller's concern.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_ENGINE};
use ring::hmac;
use tracing::instrument;
use zeroize::Zeroizing;

use crate::{config::GatewayConfig, transport::Method};

/// Header names agreed with Icepay.
pub mod headers {
    /// Merchant profile identifier.
    pub const USER_ID: &str = "USERID";
    /// Timestamp the request was stamped with.
    pub const TIMESTAMP: &str = "TIMESTAMP";
    /// Base64 HMAC-SHA256 checksum.
    pub const CHECKSUM: &str = "CHECKSUM";
    /// Content type of every request body.
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// JSON content type sent with every request.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Authentication headers for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `USERID` header value.
    pub user_id: String,
    /// `TIMESTAMP` header value.
    pub timestamp: String,
    /// `CHECKSUM` header value.
    pub checksum: String,
}

impl SignedHeaders {
    /// Header pairs ready for a [`RequestContext`](crate::transport::RequestContext).
    #[must_use]
    pub fn as_pairs(&self) -> Vec<(&str, &str)> {
        vec![
            (headers::CONTENT_TYPE, CONTENT_TYPE_JSON),
            (headers::USER_ID, self.user_id.as_str()),
            (headers::TIMESTAMP, self.timestamp.as_str()),
            (headers::CHECKSUM, self.checksum.as_str()),
        ]
    }
}

/// Computes request checksums for one gateway configuration.
#[derive(Debug, Clone, Copy)]
pub struct Signer<'a> {
    config: &'a GatewayConfig,
}

impl<'a> Signer<'a> {
    /// Creates a signer borrowing the gateway configuration.
    #[must_use]
    pub const fn new(config: &'a GatewayConfig) -> Self {
        Self { config }
    }

    /// Signs a request.
    ///
    /// `timestamp` must already be formatted with
    /// [`TIMESTAMP_FORMAT`](crate::message::TIMESTAMP_FORMAT); `body` is the
    /// exact byte sequence that will be sent (empty for GET).
    ///
    /// # Examples
    ///
    /// ```
    /// use icepay_gateway::{config::GatewayConfig, signer::Signer, transport::Method};
    ///
    /// let config = GatewayConfig::new("profile", "c2VjcmV0", true);
    /// let signed = Signer::new(&config).sign(Method::Get, "/transaction/abc", "2024-01-01T00:00:00Z", b"");
    ///
    /// assert_eq!(signed.user_id, "profile");
    /// assert!(!signed.checksum.is_empty());
    /// ```
    #[must_use]
    #[instrument(skip(self, body), fields(method = %method, body_len = body.len()))]
    pub fn sign(&self, method: Method, path: &str, timestamp: &str, body: &[u8]) -> SignedHeaders {
        let message = self.canonical_message(method, path, timestamp, body);
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.key_material());
        let checksum = BASE64_ENGINE.encode(hmac::sign(&key, &message).as_ref());

        SignedHeaders {
            user_id: self.config.contract_profile_id().to_owned(),
            timestamp: timestamp.to_owned(),
            checksum,
        }
    }

    /// Builds the byte string the checksum is computed over.
    #[must_use]
    pub fn canonical_message(
        &self,
        method: Method,
        path: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Vec<u8> {
        let head = format!(
            "{}{}{path}{}{timestamp}",
            method.as_str(),
            self.config.base_url().trim_end_matches('/'),
            self.config.contract_profile_id(),
        );

        let mut message = Vec::with_capacity(head.len() + body.len());
        message.extend_from_slice(head.as_bytes());
        message.extend_from_slice(body);
        message
    }

    fn key_material(&self) -> Zeroizing<Vec<u8>> {
        let secret = self.config.secret_key().expose();
        Zeroizing::new(BASE64_ENGINE.decode(secret).unwrap_or_else(|_| secret.as_bytes().to_vec()))
    }
}
