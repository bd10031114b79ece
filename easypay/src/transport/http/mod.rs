//! HTTP transport implementation using reqwest.

use reqwest::{Client, RequestBuilder, header::CONTENT_TYPE};
use tracing::{debug, instrument};

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{GatewayError, Result},
    transport::{FORM_CONTENT_TYPE, RequestContext, Transport, TransportResponse, sealed},
};

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// Holds one pooled [`Client`]; clones of the transport share it.
///
/// # Examples
///
/// ```
/// use easypay::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { timeout_secs: 10, http_version: HttpVersion::Http1, ..Default::default() };
/// let transport = HttpTransport::new(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates an HTTP transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is out of range or the HTTP client
    /// cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(GatewayError::Http)?;

        Ok(Self { client, http_version: config.http_version })
    }

    /// Sends a prepared request and collects the response.
    ///
    /// Non-success statuses become [`GatewayError::Http`].
    async fn execute(request: RequestBuilder) -> Result<TransportResponse> {
        let response = request.send().await?.error_for_status()?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, body_len = body.len(), "gateway responded");

        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, ctx, query), fields(path = ctx.path, param_count = query.len()))]
    async fn get<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        query: &'a [(String, String)],
    ) -> Result<TransportResponse> {
        let request = self.client.get(ctx.url()).query(query);
        Self::execute(request).await
    }

    #[instrument(skip(self, ctx, form), fields(path = ctx.path, param_count = form.len()))]
    async fn post_form<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        form: &'a [(String, String)],
    ) -> Result<TransportResponse> {
        let request = self
            .client
            .post(ctx.url())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .form(form);
        Self::execute(request).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_default_config() {
        let transport = HttpTransport::new(&HttpConfig::default()).unwrap();
        assert_eq!(transport.protocol_name(), "http");
    }

    #[test]
    fn test_http_transport_protocol_name() {
        let http1 = HttpConfig { http_version: HttpVersion::Http1, ..Default::default() };
        assert_eq!(HttpTransport::new(&http1).unwrap().protocol_name(), "http/1.1");

        let http2 = HttpConfig { http_version: HttpVersion::Http2, ..Default::default() };
        assert_eq!(HttpTransport::new(&http2).unwrap().protocol_name(), "http/2");
    }

    #[test]
    fn test_http_transport_rejects_invalid_config() {
        let config = HttpConfig { connect_timeout_secs: 0, ..Default::default() };
        let result = HttpTransport::new(&config);
        assert!(matches!(result, Err(GatewayError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_http_transport_connection_refused() {
        let config = HttpConfig { timeout_secs: 2, connect_timeout_secs: 1, ..Default::default() };
        let transport = HttpTransport::new(&config).unwrap();

        // Port 9 (discard) on loopback is not expected to accept connections.
        let ctx = RequestContext { base_url: "http://127.0.0.1:9", path: "/api.php" };
        let result = transport.get(ctx, &[]).await;
        assert!(matches!(result, Err(GatewayError::Http(_))));
    }
}
