//! Error types for the EasyPay client.
//!
//! All fallible operations return [`Result`], whose error type is
//! [`GatewayError`].
//!
//! # Error Categories
//!
//! - **Input errors** ([`GatewayError::InvalidArgument`]): raised before any network I/O
//! - **Configuration errors** ([`GatewayError::InvalidConfig`]): raised while building a client
//! - **Transport errors** ([`GatewayError::Http`]): network failures and non-2xx statuses
//! - **URL errors** ([`GatewayError::Url`]): URL construction failures
//! - **Decode errors** ([`GatewayError::Decode`]): typed response decoding failures
//!
//! # Examples
//!
//! ```
//! use easypay::error::{GatewayError, Result};
//!
//! fn require_trade_no(trade_no: Option<&str>) -> Result<&str> {
//!     trade_no.ok_or_else(|| GatewayError::InvalidArgument("trade_no is required".to_owned()))
//! }
//!
//! assert!(require_trade_no(None).is_err());
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the payment gateway.
///
/// Transport failures are passed through without retry or recovery; the
/// wrapped [`reqwest::Error`] is the one the HTTP client produced.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller-supplied input is unusable.
    ///
    /// Returned before any request is issued, e.g. when `refund` is called
    /// without either order identifier.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Client configuration is invalid.
    ///
    /// Covers malformed domains, empty credentials, out-of-range HTTP
    /// settings and unreadable or unparseable configuration files.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request failed.
    ///
    /// Includes connection failures, timeouts and non-success status codes.
    ///
    /// # Recovery
    ///
    /// The client never retries. Check gateway reachability, then decide
    /// whether the operation is safe to repeat: `mapi` and `refund` are not
    /// idempotent on every gateway.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A gateway response did not match the requested typed model.
    ///
    /// Only raised by the typed helpers in [`crate::models`]; the operations
    /// themselves return untyped JSON.
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let error = GatewayError::InvalidArgument("trade_no or out_trade_no is required".into());
        assert_eq!(
            error.to_string(),
            "Invalid argument: trade_no or out_trade_no is required"
        );
    }

    #[test]
    fn test_invalid_config_display() {
        let error = GatewayError::InvalidConfig("pid must not be empty".into());
        assert!(error.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_url_error_from_parse_error() {
        let parse_error = url::Url::parse("not a url").unwrap_err();
        let error = GatewayError::from(parse_error);
        assert!(matches!(error, GatewayError::Url(_)));
        assert!(error.to_string().starts_with("Invalid URL"));
    }
}
