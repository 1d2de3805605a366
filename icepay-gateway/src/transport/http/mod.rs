//! `reqwest` implementation of [`Transport`].
//!
//! Requests only ever go to an HTTPS, non-loopback Icepay host. The path and
//! the signed headers are checked before anything leaves the process.

use std::sync::LazyLock;

use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{GatewayError, Result},
    transport::{Method, RequestContext, Transport, TransportResponse, is_loopback},
};

/// Pooled client shared by every [`HttpTransport::new`].
#[allow(clippy::expect_used, reason = "client construction with static settings cannot fail")]
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    build_client(&HttpConfig::default()).expect("default HTTP client settings are valid")
});

fn build_client(config: &HttpConfig) -> reqwest::Result<Client> {
    let builder = Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .user_agent(config.user_agent.as_str());

    match config.http_version {
        HttpVersion::Http1 => builder.http1_only(),
        HttpVersion::Http2 => builder.http2_prior_knowledge(),
        HttpVersion::Auto => builder,
    }
    .build()
}

/// Requires HTTPS and refuses loopback hosts.
fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(GatewayError::Transport(format!(
            "refusing {} URL, only https is allowed",
            url.scheme()
        )));
    }

    if is_loopback(url) {
        return Err(GatewayError::Transport("refusing loopback host".to_owned()));
    }

    Ok(())
}

/// Paths are absolute and stay below the API prefix.
fn sanitize_path(path: &str) -> Result<&str> {
    if !path.starts_with('/') {
        return Err(GatewayError::Transport(format!("path '{path}' must start with '/'")));
    }
    if path.contains("..") || path.contains("//") {
        return Err(GatewayError::Transport(format!("path '{path}' escapes the API prefix")));
    }
    Ok(path)
}

fn breaks_header(text: &str) -> bool {
    text.contains(['\r', '\n', '\0'])
}

/// Header names and values must not split the request.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if breaks_header(name) {
        return Err(GatewayError::Transport(format!(
            "header name {name:?} contains a forbidden control character"
        )));
    }
    if breaks_header(value) {
        return Err(GatewayError::Transport(format!(
            "value of header {name} contains a forbidden control character"
        )));
    }
    Ok(())
}

/// `reqwest`-backed transport.
///
/// # Examples
///
/// ```
/// use icepay_gateway::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { http_version: HttpVersion::Http1, ..Default::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl HttpTransport {
    /// Transport on the shared default client.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches [`HttpTransport::with_config`].
    pub fn new() -> Result<Self> {
        Ok(Self { client: DEFAULT_HTTP_CLIENT.clone(), http_version: HttpVersion::Auto })
    }

    /// Transport with a dedicated client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if `config` is out of bounds and
    /// [`GatewayError::Http`] if `reqwest` cannot build the client.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(config)?;
        Ok(Self { client, http_version: config.http_version })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client, http_version: HttpVersion::Auto }
    }

    /// Validates the request and assembles the `reqwest` builder.
    fn prepare(&self, ctx: &RequestContext<'_>, method: Method) -> Result<RequestBuilder> {
        let url = Url::parse(ctx.base_url)
            .map_err(|e| GatewayError::Transport(format!("invalid base_url: {e}")))?;

        validate_url(&url)?;
        let path = sanitize_path(ctx.path)?;

        for (key, value) in &ctx.headers {
            validate_header(key, value)?;
        }

        let full_url = format!("{}{path}", ctx.base_url.trim_end_matches('/'));

        let mut request = match method {
            Method::Get => self.client.get(&full_url),
            Method::Post => self.client.post(&full_url),
        };

        for (key, value) in &ctx.headers {
            request = request.header(*key, *value);
        }

        Ok(request)
    }

    #[instrument(
        skip(self, ctx, body),
        fields(method = %method, base_url = ctx.base_url, path = ctx.path)
    )]
    async fn execute_request(
        &self,
        ctx: RequestContext<'_>,
        method: Method,
        body: Option<&[u8]>,
    ) -> Result<TransportResponse> {
        let mut request = self.prepare(&ctx, method)?;

        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned()))
            })
            .collect();
        let response_body = response.bytes().await?.to_vec();

        debug!(status, body_len = response_body.len(), "icepay responded");

        Ok(TransportResponse { status, body: response_body, headers })
    }
}

impl Transport for HttpTransport {
    async fn get<'a>(&'a self, ctx: RequestContext<'a>) -> Result<TransportResponse> {
        self.execute_request(ctx, Method::Get, None).await
    }

    async fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        self.execute_request(ctx, Method::Post, Some(body)).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
