//! Gateway facade.
//!
//! Every operation runs the same pipeline: stamp a timestamp, build the
//! message, serialize the body, sign, send through the [`Transport`] and parse
//! the answer into a [`GatewayResponse`]. One operation is one awaited HTTP
//! call; nothing is retried and nothing outlives the call.

use chrono::{DateTime, Utc};
use tracing::{Span, info, instrument, warn};

use crate::{
    config::{GatewayConfig, GatewaySettings},
    error::Result,
    message::{
        CaptureRequest, CompleteCapture, CreateTransaction, GatewayMessage, GatewayResponse,
        Outcome, PaymentMethods, PaymentMethodsRequest, PaymentRequest, Refund, RefundRequest,
        StatusRequest, TransactionStatusLookup, format_timestamp,
    },
    signer::Signer,
    transport::{HttpTransport, RequestContext, Transport},
};

/// Display name of the gateway.
pub const GATEWAY_NAME: &str = "Icepay Payments";

/// Icepay gateway bound to one configuration and one transport.
///
/// `Gateway` is `Send + Sync` when its transport is, so a single instance can
/// serve concurrent callers.
///
/// # Examples
///
/// ```rust,no_run
/// use icepay_gateway::{
///     amount::MinorUnits,
///     config::GatewayConfig,
///     gateway::Gateway,
///     message::{Outcome, PaymentRequest},
/// };
///
/// # async fn example() -> icepay_gateway::error::Result<()> {
/// let config = GatewayConfig::new("64eb3717-8b5d-4088-8108-93224675e538", "c2VjcmV0", true);
/// let gateway = Gateway::new(config)?;
///
/// let request = PaymentRequest {
///     amount: MinorUnits::new(1599),
///     currency_code: "EUR".to_owned(),
///     transaction_id: "order-1234".to_owned(),
///     payment_method: Some("IDEAL".to_owned()),
///     return_url: Some("https://shop.example.com/return".to_owned()),
///     ..Default::default()
/// };
///
/// let response = gateway.create_payment(&request).await?;
/// if response.outcome() == Outcome::Successful {
///     println!("redirect to {:?}", response.redirect_url());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Gateway<T = HttpTransport> {
    config: GatewayConfig,
    transport: T,
}

impl Gateway<HttpTransport> {
    /// Creates a gateway on the shared default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP transport cannot be created.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }

    /// Creates a gateway from TOML settings, with a transport built from the
    /// `[transport]` table.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self> {
        let transport = HttpTransport::with_config(&settings.transport)?;
        Ok(Self::with_transport(settings.gateway_config(), transport))
    }
}

impl<T: Transport> Gateway<T> {
    /// Creates a gateway on a caller-supplied transport.
    #[must_use]
    pub const fn with_transport(config: GatewayConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Transport in use.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Display name of the gateway.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        GATEWAY_NAME
    }

    /// Creates a transaction (`POST /contract/transaction`).
    ///
    /// On success the response carries the transaction reference and the
    /// `acceptanceUrl` to send the consumer to.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or if the payload cannot be
    /// serialized. Processor rejections are a [`Outcome::Failed`] response.
    #[instrument(
        skip(self, request),
        fields(transaction_id = %request.transaction_id, amount = %request.amount)
    )]
    pub async fn create_payment(&self, request: &PaymentRequest) -> Result<GatewayResponse> {
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);
        self.execute(&CreateTransaction::new(request, timestamp), timestamp).await
    }

    /// Alias of [`create_payment`](Self::create_payment).
    ///
    /// # Errors
    ///
    /// As [`create_payment`](Self::create_payment).
    pub async fn authorize(&self, request: &PaymentRequest) -> Result<GatewayResponse> {
        self.create_payment(request).await
    }

    /// Completes an authorized transaction under the configured
    /// [`CaptureMode`](crate::config::CaptureMode).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`](crate::error::GatewayError::InvalidInput)
    /// without sending anything if the transaction reference is missing, or if
    /// re-submission is configured and the original payment is missing.
    /// Otherwise as [`create_payment`](Self::create_payment).
    #[instrument(
        skip(self, request),
        fields(
            transaction_reference = %request.transaction_reference,
            mode = ?self.config.capture_mode()
        )
    )]
    pub async fn complete_capture(&self, request: &CaptureRequest) -> Result<GatewayResponse> {
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);
        let message = CompleteCapture::new(request, self.config.capture_mode(), timestamp);
        self.execute(&message, timestamp).await
    }

    /// Alias of [`complete_capture`](Self::complete_capture).
    ///
    /// # Errors
    ///
    /// As [`complete_capture`](Self::complete_capture).
    pub async fn capture(&self, request: &CaptureRequest) -> Result<GatewayResponse> {
        self.complete_capture(request).await
    }

    /// Alias of [`complete_capture`](Self::complete_capture), for the return
    /// leg of an authorize redirect.
    ///
    /// # Errors
    ///
    /// As [`complete_capture`](Self::complete_capture).
    pub async fn complete_authorize(&self, request: &CaptureRequest) -> Result<GatewayResponse> {
        self.complete_capture(request).await
    }

    /// Looks a transaction up (`GET /transaction/{reference}`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`](crate::error::GatewayError::InvalidInput)
    /// without sending anything if the reference is empty; transport failures
    /// are propagated.
    #[instrument(
        skip(self, request),
        fields(transaction_reference = %request.transaction_reference)
    )]
    pub async fn check_status(&self, request: &StatusRequest) -> Result<GatewayResponse> {
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);
        self.execute(&TransactionStatusLookup::new(request), timestamp).await
    }

    /// Alias of [`check_status`](Self::check_status).
    ///
    /// # Errors
    ///
    /// As [`check_status`](Self::check_status).
    pub async fn fetch_transaction(&self, request: &StatusRequest) -> Result<GatewayResponse> {
        self.check_status(request).await
    }

    /// Lists the payment methods enabled for the profile
    /// (`GET /paymentmethods?ContractProfileId={id}`).
    ///
    /// # Errors
    ///
    /// Returns error on transport failure.
    #[instrument(skip(self, request))]
    pub async fn list_payment_methods(
        &self,
        request: &PaymentMethodsRequest,
    ) -> Result<GatewayResponse> {
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);
        self.execute(&PaymentMethods, timestamp).await
    }

    /// Alias of [`list_payment_methods`](Self::list_payment_methods).
    ///
    /// # Errors
    ///
    /// As [`list_payment_methods`](Self::list_payment_methods).
    pub async fn fetch_payment_methods(
        &self,
        request: &PaymentMethodsRequest,
    ) -> Result<GatewayResponse> {
        self.list_payment_methods(request).await
    }

    /// Refunds a transaction (`POST /transaction/{reference}/refund`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`](crate::error::GatewayError::InvalidInput)
    /// without sending anything if the reference is empty; transport failures
    /// are propagated.
    #[instrument(
        skip(self, request),
        fields(transaction_reference = %request.transaction_reference, amount = %request.amount)
    )]
    pub async fn refund_payment(&self, request: &RefundRequest) -> Result<GatewayResponse> {
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);
        self.execute(&Refund::new(request), timestamp).await
    }

    /// Alias of [`refund_payment`](Self::refund_payment).
    ///
    /// # Errors
    ///
    /// As [`refund_payment`](Self::refund_payment).
    pub async fn refund(&self, request: &RefundRequest) -> Result<GatewayResponse> {
        self.refund_payment(request).await
    }

    #[instrument(
        skip_all,
        fields(operation = %message.operation(), method = %message.method(), path)
    )]
    async fn execute<M: GatewayMessage>(
        &self,
        message: &M,
        timestamp: DateTime<Utc>,
    ) -> Result<GatewayResponse> {
        let method = message.method();
        let path = message.path(&self.config)?;
        Span::current().record("path", path.as_str());

        let body = message.body(&self.config)?;
        let timestamp = format_timestamp(&timestamp);
        let signed = Signer::new(&self.config).sign(method, &path, &timestamp, &body);

        let ctx = RequestContext {
            base_url: self.config.base_url(),
            path: &path,
            headers: signed.as_pairs(),
        };

        let raw = self
            .transport
            .send(method, ctx, Some(body.as_slice()))
            .await
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    protocol = self.transport.protocol_name(),
                    "icepay request failed"
                );
            })?;

        let response = GatewayResponse::parse(message.operation(), &raw);

        match response.outcome() {
            Outcome::Successful | Outcome::Pending => info!(
                outcome = %response.outcome(),
                status = raw.status,
                transaction_reference = response.transaction_reference(),
                "icepay operation completed"
            ),
            Outcome::Cancelled | Outcome::Failed => warn!(
                outcome = %response.outcome(),
                status = raw.status,
                error_message = response.message(),
                "icepay operation not successful"
            ),
        }

        Ok(response)
    }
}
