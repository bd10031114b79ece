//! Request parameters.
//!
//! Gateway requests are open string-keyed maps. [`Params`] is that map,
//! ordered by key so iteration already yields the canonical signing order.
//! [`PaymentArgs`] and [`ApiPaymentArgs`] cover the well-known payment
//! fields and keep an extension area for gateway-specific ones.

use std::{collections::BTreeMap, convert::Infallible, fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::error::{GatewayError, Result};

/// A single parameter value.
///
/// [`ParamValue::Null`] and empty text are treated as absent: they are never
/// signed and never sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Text value.
    Text(String),
    /// Integer value.
    Int(i64),
    /// Decimal value, rendered with its stored scale (`1.00` stays `1.00`).
    Decimal(Decimal),
    /// Explicitly absent value.
    Null,
}

impl ParamValue {
    /// Returns `true` for [`ParamValue::Null`] and empty text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Null => true,
            Self::Int(_) | Self::Decimal(_) => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Open parameter map, sorted by key.
///
/// Keys compare byte-wise, which is the order the gateway signs in.
///
/// # Examples
///
/// ```
/// use easypay::params::Params;
///
/// let mut params = Params::new();
/// params.insert("type", "alipay");
/// params.insert("money", "1.00");
/// params.insert("sitename", None::<String>);
///
/// let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
/// assert_eq!(keys, ["money", "sitename", "type"]);
/// assert_eq!(params.non_empty().count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.inner.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.inner.remove(key)
    }

    /// Returns `true` if `key` is present, even with an empty value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of entries, empty ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over entries whose value is not empty, in key order.
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.iter().filter(|(_, v)| !v.is_empty())
    }

    /// Overlays `self` on top of `defaults`.
    ///
    /// Entries in `self` win on collision, including empty ones, so a caller
    /// can suppress a default by passing an empty value.
    #[must_use]
    pub fn over(self, defaults: Self) -> Self {
        let mut merged = defaults;
        merged.inner.extend(self.inner);
        merged
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Params {
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;
    type Item = (String, ParamValue);

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

/// Payment channel (`type` field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentType {
    /// Alipay.
    Alipay,
    /// WeChat Pay.
    WxPay,
    /// QQ Wallet.
    QqPay,
    /// UnionPay / bank card.
    Bank,
    /// JD Pay.
    JdPay,
    /// Any other channel code the gateway accepts.
    Other(String),
}

impl PaymentType {
    /// Returns the wire code for this channel.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Alipay => "alipay",
            Self::WxPay => "wxpay",
            Self::QqPay => "qqpay",
            Self::Bank => "bank",
            Self::JdPay => "jdpay",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "alipay" => Self::Alipay,
            "wxpay" => Self::WxPay,
            "qqpay" => Self::QqPay,
            "bank" => Self::Bank,
            "jdpay" => Self::JdPay,
            other => Self::Other(other.to_owned()),
        })
    }
}

/// Client device hint for `mapi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// Desktop browser.
    Pc,
    /// Mobile browser.
    Mobile,
    /// QQ in-app browser.
    Qq,
    /// WeChat in-app browser.
    Wechat,
    /// Alipay in-app browser.
    Alipay,
}

impl Device {
    /// Returns the wire code for this device.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::Mobile => "mobile",
            Self::Qq => "qq",
            Self::Wechat => "wechat",
            Self::Alipay => "alipay",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pc" => Ok(Self::Pc),
            "mobile" => Ok(Self::Mobile),
            "qq" => Ok(Self::Qq),
            "wechat" => Ok(Self::Wechat),
            "alipay" => Ok(Self::Alipay),
            other => Err(GatewayError::InvalidArgument(format!("unknown device: {other}"))),
        }
    }
}

/// Arguments for a payment (`pay` and `mapi`).
///
/// # Examples
///
/// ```
/// use easypay::params::{PaymentArgs, PaymentType};
///
/// let args = PaymentArgs::new(PaymentType::Alipay, "20240101001", "Test", "1.00".parse().unwrap())
///     .with_sitename("Demo Shop")
///     .with_field("attach", "order-42");
///
/// let params = args.to_params();
/// assert_eq!(params.get("type").unwrap().to_string(), "alipay");
/// assert_eq!(params.get("money").unwrap().to_string(), "1.00");
/// assert_eq!(params.get("attach").unwrap().to_string(), "order-42");
/// ```
#[derive(Debug, Clone)]
pub struct PaymentArgs {
    /// Payment channel (`type`).
    pub payment_type: PaymentType,
    /// Merchant order number (`out_trade_no`).
    pub out_trade_no: String,
    /// Product name (`name`).
    pub name: String,
    /// Amount (`money`). Not validated beyond what [`Decimal`] enforces.
    pub money: Decimal,
    /// Asynchronous notification URL, overriding the client default.
    pub notify_url: Option<String>,
    /// Browser return URL, overriding the client default.
    pub return_url: Option<String>,
    /// Site name shown on the cashier page.
    pub sitename: Option<String>,
    /// Opaque business parameter echoed back in notifications (`params`).
    pub params: Option<String>,
    /// Gateway-specific fields not covered above.
    pub extra: Params,
}

impl PaymentArgs {
    /// Creates payment arguments with the required fields.
    #[must_use]
    pub fn new(
        payment_type: PaymentType,
        out_trade_no: impl Into<String>,
        name: impl Into<String>,
        money: Decimal,
    ) -> Self {
        Self {
            payment_type,
            out_trade_no: out_trade_no.into(),
            name: name.into(),
            money,
            notify_url: None,
            return_url: None,
            sitename: None,
            params: None,
            extra: Params::new(),
        }
    }

    /// Sets the notification URL for this payment.
    #[must_use]
    pub fn with_notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = Some(url.into());
        self
    }

    /// Sets the return URL for this payment.
    #[must_use]
    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    /// Sets the site name.
    #[must_use]
    pub fn with_sitename(mut self, sitename: impl Into<String>) -> Self {
        self.sitename = Some(sitename.into());
        self
    }

    /// Sets the opaque business parameter.
    #[must_use]
    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Adds a gateway-specific field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// Checks that the required text fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidArgument`] if `type`, `out_trade_no` or
    /// `name` is empty.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("type", self.payment_type.as_str()),
            ("out_trade_no", self.out_trade_no.as_str()),
            ("name", self.name.as_str()),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(GatewayError::InvalidArgument(format!("{field} is required")));
            }
        }
        Ok(())
    }

    /// Converts the arguments into a parameter map.
    ///
    /// Extension fields are applied first; well-known fields overwrite them.
    /// Unset optional fields are left out so client defaults still apply.
    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = self.extra.clone();
        params.insert("type", self.payment_type.as_str());
        params.insert("out_trade_no", &self.out_trade_no);
        params.insert("name", &self.name);
        params.insert("money", self.money);

        let optional = [
            ("notify_url", &self.notify_url),
            ("return_url", &self.return_url),
            ("sitename", &self.sitename),
            ("params", &self.params),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.insert(key, value);
            }
        }
        params
    }
}

/// Arguments for a direct API payment (`mapi`).
#[derive(Debug, Clone)]
pub struct ApiPaymentArgs {
    /// Common payment fields.
    pub payment: PaymentArgs,
    /// End-user IP address (`clientip`).
    pub clientip: Option<String>,
    /// End-user device (`device`).
    pub device: Option<Device>,
}

impl ApiPaymentArgs {
    /// Wraps payment arguments without device hints.
    #[must_use]
    pub fn new(payment: PaymentArgs) -> Self {
        Self { payment, clientip: None, device: None }
    }

    /// Sets the end-user IP address.
    #[must_use]
    pub fn with_clientip(mut self, clientip: impl Into<String>) -> Self {
        self.clientip = Some(clientip.into());
        self
    }

    /// Sets the end-user device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Checks the required payment fields.
    ///
    /// # Errors
    ///
    /// See [`PaymentArgs::validate`].
    pub fn validate(&self) -> Result<()> {
        self.payment.validate()
    }

    /// Converts the arguments into a parameter map.
    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = self.payment.to_params();
        if let Some(clientip) = &self.clientip {
            params.insert("clientip", clientip);
        }
        if let Some(device) = self.device {
            params.insert("device", device.as_str());
        }
        params
    }
}

impl From<PaymentArgs> for ApiPaymentArgs {
    fn from(payment: PaymentArgs) -> Self {
        Self::new(payment)
    }
}
