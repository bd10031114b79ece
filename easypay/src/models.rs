//! Typed views over gateway responses and callbacks.
//!
//! Operations return the gateway's JSON untouched as [`serde_json::Value`].
//! These structs are optional: decode into them with [`decode`] when the
//! fields you need are the common ones. Every struct keeps unrecognised
//! fields in `extra`, and numeric fields accept both JSON numbers and
//! numeric strings since gateways differ on this.

use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{error::Result, params::Params};

/// `code` value the gateway uses for success.
pub const SUCCESS_CODE: i64 = 1;

/// `trade_status` value of a paid order in notifications.
pub const TRADE_SUCCESS: &str = "TRADE_SUCCESS";

/// Decodes an untyped gateway response into a typed model.
///
/// # Errors
///
/// Returns [`GatewayError::Decode`](crate::GatewayError::Decode) if the
/// value does not fit `T`.
///
/// # Examples
///
/// ```
/// use easypay::models::{MapiResponse, decode};
///
/// let value = serde_json::json!({
///     "code": 1,
///     "trade_no": "2024010100001",
///     "payurl": "https://pay.example.com/pay/2024010100001/"
/// });
/// let response: MapiResponse = decode(value).unwrap();
/// assert!(response.is_success());
/// assert_eq!(response.payurl.as_deref(), Some("https://pay.example.com/pay/2024010100001/"));
/// ```
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Response of `mapi.php`.
#[derive(Debug, Clone, Deserialize)]
pub struct MapiResponse {
    /// Status code, `1` on success.
    #[serde(deserialize_with = "lenient::int")]
    pub code: i64,
    /// Message, usually set on failure.
    #[serde(default)]
    pub msg: Option<String>,
    /// Gateway order number.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub trade_no: Option<String>,
    /// Cashier page to redirect the user to.
    #[serde(default)]
    pub payurl: Option<String>,
    /// QR code content for scan-to-pay.
    #[serde(default)]
    pub qrcode: Option<String>,
    /// App deep link for mobile payment.
    #[serde(default)]
    pub urlscheme: Option<String>,
    /// Unrecognised fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MapiResponse {
    /// Returns `true` if the gateway accepted the payment.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Response of `api.php?act=query`.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantInfo {
    /// Status code, `1` on success.
    #[serde(deserialize_with = "lenient::int")]
    pub code: i64,
    /// Message, usually set on failure.
    #[serde(default)]
    pub msg: Option<String>,
    /// Merchant id.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub pid: Option<String>,
    /// Account status flag.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub active: Option<String>,
    /// Current balance.
    #[serde(default)]
    pub money: Option<Decimal>,
    /// Settlement account.
    #[serde(default)]
    pub account: Option<String>,
    /// Settlement account holder.
    #[serde(default)]
    pub username: Option<String>,
    /// Unrecognised fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MerchantInfo {
    /// Returns `true` if the query succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Response of `api.php?act=order`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInfo {
    /// Status code, `1` on success.
    #[serde(deserialize_with = "lenient::int")]
    pub code: i64,
    /// Message, usually set on failure.
    #[serde(default)]
    pub msg: Option<String>,
    /// Gateway order number.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub trade_no: Option<String>,
    /// Merchant order number.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub out_trade_no: Option<String>,
    /// Payment channel.
    #[serde(default, rename = "type")]
    pub payment_type: Option<String>,
    /// Product name.
    #[serde(default)]
    pub name: Option<String>,
    /// Order amount.
    #[serde(default)]
    pub money: Option<Decimal>,
    /// Payment status, `1` when paid.
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub status: Option<i64>,
    /// Unrecognised fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderInfo {
    /// Returns `true` if the query succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Returns `true` if the order has been paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == Some(1)
    }
}

/// Response of `api.php?act=settle` and `api.php?act=orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    /// Status code, `1` on success.
    #[serde(deserialize_with = "lenient::int")]
    pub code: i64,
    /// Message, usually set on failure.
    #[serde(default)]
    pub msg: Option<String>,
    /// Records.
    #[serde(default)]
    pub data: Vec<Value>,
    /// Unrecognised fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListResponse {
    /// Returns `true` if the query succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Response of `api.php` refunds.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    /// Status code, `1` on success.
    #[serde(deserialize_with = "lenient::int")]
    pub code: i64,
    /// Message.
    #[serde(default)]
    pub msg: Option<String>,
    /// Unrecognised fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RefundResponse {
    /// Returns `true` if the refund was accepted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Parameters the gateway sends to `notify_url` and `return_url`.
///
/// Verify the signature with
/// [`EasyPay::verify_notify`](crate::EasyPay::verify_notify) before trusting
/// any of these fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyParams {
    /// Merchant id.
    pub pid: String,
    /// Gateway order number.
    pub trade_no: String,
    /// Merchant order number.
    pub out_trade_no: String,
    /// Payment channel.
    #[serde(rename = "type")]
    pub payment_type: String,
    /// Product name.
    #[serde(default)]
    pub name: Option<String>,
    /// Paid amount.
    pub money: Decimal,
    /// Trade status, [`TRADE_SUCCESS`] when paid.
    pub trade_status: String,
    /// Opaque business parameter passed at payment time.
    #[serde(default)]
    pub param: Option<String>,
    /// Signature.
    pub sign: String,
    /// Signature type.
    #[serde(default)]
    pub sign_type: Option<String>,
    /// Unrecognised fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotifyParams {
    /// Decodes notification fields from a parameter map.
    ///
    /// Empty values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`](crate::GatewayError::Decode) if a
    /// required field is missing or malformed.
    pub fn from_params(params: &Params) -> Result<Self> {
        let map: Map<String, Value> = params
            .non_empty()
            .map(|(k, v)| (k.to_owned(), Value::String(v.to_string())))
            .collect();
        decode(Value::Object(map))
    }

    /// Returns `true` if the notification reports a completed payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.trade_status == TRADE_SUCCESS
    }
}

/// Deserializers tolerant of numbers sent as strings and vice versa.
mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};
    use serde_json::Value;

    pub(super) fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        opt_int(deserializer)?.ok_or_else(|| D::Error::custom("expected an integer, got null"))
    }

    pub(super) fn opt_int<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected an integer, got {n}"))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected an integer, got {s:?}"))),
            Some(other) => Err(D::Error::custom(format!("expected an integer, got {other}"))),
        }
    }

    pub(super) fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(D::Error::custom(format!("expected a string, got {other}"))),
        }
    }
}
