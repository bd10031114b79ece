//! Gateway client.
//!
//! [`EasyPay`] owns the credentials and a transport. Payment operations
//! (`pay`, `mapi`) send MD5-signed parameter sets; merchant API operations on
//! `api.php` authenticate with `pid` and `key` directly, as the gateway
//! expects.

use std::fmt;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    config::GatewayConfig,
    error::{GatewayError, Result},
    params::{ApiPaymentArgs, Params, PaymentArgs},
    sign::{Md5Signer, SignedParams},
    transport::{HttpTransport, RequestContext, Transport, TransportResponse},
};

/// Redirect payment endpoint.
pub const SUBMIT_PATH: &str = "/submit.php";
/// Direct payment endpoint.
pub const MAPI_PATH: &str = "/mapi.php";
/// Merchant API endpoint.
pub const API_PATH: &str = "/api.php";

/// Client for an EasyPay-compatible gateway.
///
/// Immutable after construction and safe to share between tasks; every
/// operation is a single independent request.
///
/// # Examples
///
/// ```
/// use easypay::{
///     EasyPay, GatewayConfig,
///     params::{PaymentArgs, PaymentType},
/// };
///
/// # fn example() -> easypay::Result<()> {
/// let client = EasyPay::new(GatewayConfig::new("https://pay.example.com/", "1000", "testkey"))?;
///
/// let args = PaymentArgs::new(PaymentType::Alipay, "20240101001", "Test", "1.00".parse().unwrap());
/// let url = client.pay(&args)?;
///
/// assert!(url.starts_with("https://pay.example.com/submit.php?"));
/// assert!(url.contains("sign=724dc8d0a793b2ed68f34019f2245e29"));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct EasyPay<T: Transport = HttpTransport> {
    base_url: String,
    pid: String,
    signer: Md5Signer,
    notify_url: Option<String>,
    return_url: Option<String>,
    transport: T,
}

impl<T: Transport + fmt::Debug> fmt::Debug for EasyPay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasyPay")
            .field("base_url", &self.base_url)
            .field("pid", &self.pid)
            .field("signer", &self.signer)
            .field("notify_url", &self.notify_url)
            .field("return_url", &self.return_url)
            .field("transport", &self.transport)
            .finish()
    }
}

impl EasyPay<HttpTransport> {
    /// Creates a client with a reqwest transport built from `config.http`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the configuration fails
    /// validation, or [`GatewayError::Http`] if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.http)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> EasyPay<T> {
    /// Creates a client over an existing transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the configuration fails validation.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        let base_url = config.validated_base_url()?;
        Ok(Self {
            base_url,
            pid: config.pid,
            signer: Md5Signer::new(config.key),
            notify_url: config.notify_url,
            return_url: config.return_url,
            transport,
        })
    }

    /// Gateway base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Protocol name of the underlying transport (`http`, `http/1.1`, `http/2`).
    #[must_use]
    pub fn protocol(&self) -> &'static str {
        self.transport.protocol_name()
    }

    /// Merchant id.
    #[must_use]
    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// Signer bound to the merchant key.
    #[must_use]
    pub fn signer(&self) -> &Md5Signer {
        &self.signer
    }

    /// Client defaults merged under every signed request.
    fn defaults(&self) -> Params {
        let mut defaults = Params::new();
        defaults.insert("pid", self.pid.as_str());
        defaults.insert("notify_url", self.notify_url.as_deref());
        defaults.insert("return_url", self.return_url.as_deref());
        defaults
    }

    /// Merges `params` over the client defaults and signs the result.
    ///
    /// Caller values win on collision; an empty caller value removes the
    /// default. Empty values, `sign` and `sign_type` never reach the payload.
    #[must_use]
    pub fn sign(&self, params: Params) -> SignedParams {
        self.signer.sign_params(&params.over(self.defaults()))
    }

    /// Builds the redirect URL for a page-jump payment (`submit.php`).
    ///
    /// No request is made; send the user's browser to the returned URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] if a required field is empty.
    pub fn pay(&self, args: &PaymentArgs) -> Result<String> {
        args.validate()?;
        self.pay_params(args.to_params())
    }

    /// Builds a redirect URL from a raw parameter map.
    ///
    /// Use this for gateway variants whose fields [`PaymentArgs`] does not
    /// describe. Fields are not checked.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Url`] if the URL cannot be built.
    pub fn pay_params(&self, params: Params) -> Result<String> {
        let signed = self.sign(params);
        let mut url = Url::parse(&format!("{}{SUBMIT_PATH}", self.base_url))?;
        url.query_pairs_mut().extend_pairs(signed.as_pairs());
        debug!(
            out_trade_no = signed.get("out_trade_no").unwrap_or_default(),
            "built redirect payment URL"
        );
        Ok(url.into())
    }

    /// Creates a payment through the direct API (`mapi.php`).
    ///
    /// Returns the gateway's JSON, typically holding `payurl`, `qrcode` or
    /// `urlscheme`; see [`MapiResponse`](crate::models::MapiResponse).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] if a required field is empty,
    /// or [`GatewayError::Http`] if the request fails.
    #[instrument(
        skip(self, args),
        fields(out_trade_no = %args.payment.out_trade_no, payment_type = %args.payment.payment_type)
    )]
    pub async fn mapi(&self, args: &ApiPaymentArgs) -> Result<Value> {
        args.validate()?;
        self.mapi_params(args.to_params()).await
    }

    /// Creates a direct API payment from a raw parameter map.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the request fails.
    pub async fn mapi_params(&self, params: Params) -> Result<Value> {
        let signed = self.sign(params);
        let response = self.transport.post_form(self.ctx(MAPI_PATH), signed.as_pairs()).await?;
        Ok(self.finish(MAPI_PATH, &response))
    }

    /// Queries merchant information (`act=query`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the request fails.
    #[instrument(skip(self))]
    pub async fn query(&self) -> Result<Value> {
        self.api_get(self.api_params("query")).await
    }

    /// Queries settlement records (`act=settle`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the request fails.
    #[instrument(skip(self))]
    pub async fn settle(&self) -> Result<Value> {
        self.api_get(self.api_params("settle")).await
    }

    /// Queries a single order (`act=order`) by merchant or gateway order number.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] if neither identifier is
    /// given, or [`GatewayError::Http`] if the request fails.
    #[instrument(skip(self))]
    pub async fn order(
        &self,
        out_trade_no: Option<&str>,
        trade_no: Option<&str>,
    ) -> Result<Value> {
        require_order_id(trade_no, out_trade_no)?;
        let mut query = self.api_params("order");
        push_present(&mut query, "out_trade_no", out_trade_no);
        push_present(&mut query, "trade_no", trade_no);
        self.api_get(query).await
    }

    /// Queries orders in batch (`act=orders`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Value> {
        self.api_get(self.api_params("orders")).await
    }

    /// Refunds an order (`act=refund`, POST).
    ///
    /// `money` defaults to the gateway's full-refund behavior when omitted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] before any request if both
    /// `trade_no` and `out_trade_no` are missing, or [`GatewayError::Http`]
    /// if the request fails.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        trade_no: Option<&str>,
        out_trade_no: Option<&str>,
        money: Option<Decimal>,
    ) -> Result<Value> {
        require_order_id(trade_no, out_trade_no)?;

        let mut form = self.api_params("refund");
        push_present(&mut form, "trade_no", trade_no);
        push_present(&mut form, "out_trade_no", out_trade_no);
        if let Some(money) = money {
            form.push(("money".to_owned(), money.to_string()));
        }

        let response = self.transport.post_form(self.ctx(API_PATH), &form).await?;
        Ok(self.finish(API_PATH, &response))
    }

    /// Verifies a callback sent to `notify_url` or `return_url`.
    ///
    /// Checks the MD5 signature and, when present, that `pid` is this
    /// merchant's. Decode the fields with
    /// [`NotifyParams::from_params`](crate::models::NotifyParams::from_params)
    /// only after this returns `true`.
    #[must_use]
    pub fn verify_notify(&self, params: &Params) -> bool {
        if let Some(pid) = params.get("pid")
            && !pid.is_empty()
            && pid.to_string() != self.pid
        {
            debug!("notification pid does not match merchant");
            return false;
        }
        let valid = self.signer.verify(params);
        if !valid {
            debug!("notification signature mismatch");
        }
        valid
    }

    fn ctx<'a>(&'a self, path: &'a str) -> RequestContext<'a> {
        RequestContext { base_url: &self.base_url, path }
    }

    /// `act`, `pid` and `key`: the authentication `api.php` expects.
    fn api_params(&self, act: &str) -> Vec<(String, String)> {
        vec![
            ("act".to_owned(), act.to_owned()),
            ("pid".to_owned(), self.pid.clone()),
            ("key".to_owned(), self.signer.key().to_owned()),
        ]
    }

    async fn api_get(&self, query: Vec<(String, String)>) -> Result<Value> {
        let response = self.transport.get(self.ctx(API_PATH), &query).await?;
        Ok(self.finish(API_PATH, &response))
    }

    fn finish(&self, path: &str, response: &TransportResponse) -> Value {
        let body = decode_body(response);
        debug!(
            path,
            status = response.status,
            protocol = self.transport.protocol_name(),
            json = !body.is_string(),
            "gateway response decoded"
        );
        body
    }
}

fn require_order_id(trade_no: Option<&str>, out_trade_no: Option<&str>) -> Result<()> {
    let present = |id: Option<&str>| id.is_some_and(|s| !s.is_empty());
    if present(trade_no) || present(out_trade_no) {
        Ok(())
    } else {
        Err(GatewayError::InvalidArgument(
            "either trade_no or out_trade_no is required".to_owned(),
        ))
    }
}

fn push_present(pairs: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        pairs.push((key.to_owned(), value.to_owned()));
    }
}

/// Parses the body as JSON, passing anything else through as a string.
fn decode_body(response: &TransportResponse) -> Value {
    serde_json::from_slice(&response.body).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&response.body).into_owned())
    })
}
