//! Transport layer.
//!
//! The client talks to the gateway through the sealed [`Transport`] trait.
//! Two request shapes cover every gateway operation: GET with a query string
//! and POST with an `application/x-www-form-urlencoded` body.
//!
//! # Examples
//!
//! ```rust,no_run
//! use easypay::transport::{HttpConfig, HttpTransport, RequestContext, Transport};
//!
//! # async fn example() -> easypay::error::Result<()> {
//! let transport = HttpTransport::new(&HttpConfig::default())?;
//!
//! let ctx = RequestContext { base_url: "https://pay.example.com", path: "/api.php" };
//! let query = vec![("act".to_owned(), "query".to_owned())];
//!
//! let response = transport.get(ctx, &query).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::error::Result;

pub mod config;
pub mod http;
#[cfg(test)]
pub(crate) mod recording;
mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Content type used for every POST body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Target of a transport request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Gateway base URL without trailing slash (e.g. `https://pay.example.com`).
    pub base_url: &'a str,
    /// Endpoint path (e.g. `/api.php`).
    pub path: &'a str,
}

impl RequestContext<'_> {
    /// Joins base URL and path.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

/// Response from a transport request.
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

/// Gateway transport.
///
/// Sealed: only implementations inside this crate exist. Implementations
/// must fail with [`GatewayError::Http`](crate::GatewayError::Http) on
/// network errors and non-success statuses, and must not retry.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Executes a GET request with `query` appended as a query string.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the gateway answers with a non-success status.
    fn get<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        query: &'a [(String, String)],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a POST request with `form` as a form-urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the gateway answers with a non-success status.
    fn post_form<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        form: &'a [(String, String)],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Protocol name recorded in client logs.
    fn protocol_name(&self) -> &'static str;
}
