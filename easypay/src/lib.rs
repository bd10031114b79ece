//! EasyPay: client for EasyPay-compatible payment gateways
//!
//! EasyPay ("易支付") gateways expose a small PHP-style HTTP API used by many
//! third-party payment aggregators. This crate signs requests the way those
//! gateways expect, builds redirect payment URLs and calls the merchant API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Merchant app   │
//! └────────┬────────┘
//!          │ PaymentArgs / Params
//! ┌────────▼────────────────────────────────────────┐
//! │               EasyPay (this crate)              │
//! │  ┌──────────────┐      ┌──────────────────┐     │
//! │  │  Operations  │──────│  MD5 signatures  │     │
//! │  │  (pay, mapi, │      │  (sorted k=v +   │     │
//! │  │   api.php)   │      │   merchant key)  │     │
//! │  └──────┬───────┘      └──────────────────┘     │
//! │         │ Transport (reqwest)                   │
//! └─────────┼───────────────────────────────────────┘
//!           │ GET query / POST form
//! ┌─────────▼───────┐
//! │ EasyPay gateway │  submit.php, mapi.php, api.php
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Redirect Payment
//!
//! ```rust
//! use easypay::{EasyPay, GatewayConfig, PaymentArgs, PaymentType};
//!
//! # fn example() -> easypay::Result<()> {
//! let config = GatewayConfig::new("https://pay.example.com", "1000", "testkey")
//!     .with_notify_url("https://shop.example.com/notify");
//! let client = EasyPay::new(config)?;
//!
//! let args = PaymentArgs::new(PaymentType::Alipay, "20240101001", "Test", "1.00".parse().unwrap());
//! let url = client.pay(&args)?;
//!
//! // Redirect the user's browser to `url`
//! println!("{url}");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## 2. Direct API Payment
//!
//! ```rust,no_run
//! use easypay::{ApiPaymentArgs, Device, EasyPay, GatewayConfig, PaymentArgs, PaymentType};
//! use easypay::models::{MapiResponse, decode};
//!
//! # async fn example() -> easypay::Result<()> {
//! let client = EasyPay::new(GatewayConfig::from_env()?)?;
//!
//! let args = ApiPaymentArgs::new(PaymentArgs::new(
//!     PaymentType::WxPay,
//!     "20240101002",
//!     "Membership",
//!     "9.90".parse().unwrap(),
//! ))
//! .with_clientip("203.0.113.7")
//! .with_device(Device::Mobile);
//!
//! let response: MapiResponse = decode(client.mapi(&args).await?)?;
//! if response.is_success() {
//!     println!("QR code: {:?}", response.qrcode);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Verify a Notification
//!
//! ```rust
//! use easypay::{EasyPay, GatewayConfig, Params, models::NotifyParams};
//!
//! # fn example() -> easypay::Result<()> {
//! let client = EasyPay::new(GatewayConfig::new("https://pay.example.com", "1000", "testkey"))?;
//!
//! // Query string received on notify_url
//! let received: Params = url::form_urlencoded::parse(
//!     b"pid=1000&trade_no=1&out_trade_no=A1&type=alipay&name=Test&money=1.00\
//!       &trade_status=TRADE_SUCCESS&sign=0&sign_type=MD5",
//! )
//! .into_owned()
//! .collect();
//!
//! if client.verify_notify(&received) {
//!     let notify = NotifyParams::from_params(&received)?;
//!     println!("paid: {}", notify.is_paid());
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Module Organization
//!
//! - [`client`]: The [`EasyPay`] client and its operations
//! - [`sign`]: Canonical string construction and MD5 signing
//! - [`params`]: Parameter maps and typed payment arguments
//! - [`config`]: Client configuration from code, TOML or environment
//! - [`models`]: Typed views over gateway JSON responses
//! - [`transport`]: HTTP transport abstraction
//! - [`error`]: Error types
//!
//! # Security Considerations
//!
//! - **Never hardcode keys**: load them from a config file or environment variables
//! - **Always verify notifications**: call [`EasyPay::verify_notify`] before trusting
//!   any callback field
//! - **Use HTTPS**: merchant API calls carry the key in the request; plain HTTP
//!   domains are accepted but logged as a warning
//! - MD5 signing is what the gateway protocol defines; it authenticates requests
//!   but is not a modern MAC
//!
//! # Error Handling
//!
//! All operations return [`Result<T, GatewayError>`](error::Result):
//!
//! ```rust
//! use easypay::{EasyPay, GatewayConfig, GatewayError};
//!
//! # async fn example() {
//! let client = EasyPay::new(GatewayConfig::new("https://pay.example.com", "1000", "testkey")).unwrap();
//!
//! match client.refund(None, None, None).await {
//!     Ok(response) => println!("{response}"),
//!     Err(GatewayError::InvalidArgument(msg)) => eprintln!("Bad input: {msg}"),
//!     Err(GatewayError::Http(e)) => eprintln!("Network error: {e}"),
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod params;
pub mod sign;
pub mod transport;

pub use client::EasyPay;
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use params::{ApiPaymentArgs, Device, ParamValue, Params, PaymentArgs, PaymentType};
pub use sign::{Md5Signer, SignedParams};
