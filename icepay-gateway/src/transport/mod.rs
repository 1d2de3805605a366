//! Transport abstraction.
//!
//! The gateway never talks to the network itself: it hands a fully signed
//! request to a [`Transport`] and gets the raw status, body and headers back.
//! [`HttpTransport`] is the `reqwest` implementation; callers can inject their
//! own (a proxying client, a recording double in tests).
//!
//! A transport is a pass-through. It does not retry, does not interpret the
//! status code and does not parse the body.
//!
//! # Examples
//!
//! ```rust,no_run
//! use icepay_gateway::transport::{HttpTransport, RequestContext, Transport};
//!
//! # async fn example() -> icepay_gateway::error::Result<()> {
//! let transport = HttpTransport::new()?;
//!
//! let ctx = RequestContext {
//!     base_url: "https://acc-interconnect.icepay.com/api",
//!     path: "/paymentmethods?ContractProfileId=64eb3717-8b5d-4088-8108-93224675e538",
//!     headers: vec![("USERID", "64eb3717-8b5d-4088-8108-93224675e538")],
//! };
//!
//! let response = transport.get(ctx).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::{fmt, net::IpAddr};

use url::{Host, Url};

use crate::error::Result;

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// True when `url` names `localhost` or a loopback address.
pub(crate) fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

/// HTTP verbs used by the Icepay API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`, no body.
    Get,
    /// `POST` with a JSON body.
    Post,
}

impl Method {
    /// Upper-case verb as it appears on the wire and in the checksum.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a transport needs to address a request.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// API base URL, e.g. `https://interconnect.icepay.com/api`.
    pub base_url: &'a str,
    /// Path including any query string, e.g. `/transaction/abc/refund`.
    pub path: &'a str,
    /// Headers to send verbatim (authentication, content type).
    pub headers: Vec<(&'a str, &'a str)>,
}

/// Raw processor response.
///
/// Returned for every HTTP status; a 400 is data for the parser, not an error.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

/// Issues one HTTP call and returns the raw response.
///
/// # Examples
///
/// A transport that answers every call with a canned body:
///
/// ```
/// use icepay_gateway::{
///     error::Result,
///     transport::{RequestContext, Transport, TransportResponse},
/// };
///
/// #[derive(Debug)]
/// struct Canned(&'static str);
///
/// impl Transport for Canned {
///     async fn get<'a>(&'a self, _ctx: RequestContext<'a>) -> Result<TransportResponse> {
///         Ok(TransportResponse { status: 200, body: self.0.as_bytes().to_vec(), headers: vec![] })
///     }
///
///     async fn post<'a>(
///         &'a self,
///         ctx: RequestContext<'a>,
///         _body: &'a [u8],
///     ) -> Result<TransportResponse> {
///         self.get(ctx).await
///     }
///
///     fn protocol_name(&self) -> &'static str {
///         "canned"
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Executes a GET request.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the response cannot be read.
    fn get<'a>(
        &'a self,
        ctx: RequestContext<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a POST request with body.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the response cannot be read.
    fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Dispatches on `method`; a GET ignores `body`.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying call unchanged.
    fn send<'a>(
        &'a self,
        method: Method,
        ctx: RequestContext<'a>,
        body: Option<&'a [u8]>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a {
        async move {
            match method {
                Method::Get => self.get(ctx).await,
                Method::Post => self.post(ctx, body.unwrap_or_default()).await,
            }
        }
    }

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}
