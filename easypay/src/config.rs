//! Gateway credentials and client configuration.
//!
//! A [`GatewayConfig`] is validated once when a client is built and never
//! changes afterwards. It can be built in code, parsed from TOML, read from a
//! file, or taken from the environment.
//!
//! ```toml
//! domain = "https://pay.example.com/"
//! pid = "1000"
//! key = "merchant-key"
//! notify_url = "https://shop.example.com/notify"
//! return_url = "https://shop.example.com/return"
//!
//! [http]
//! timeout_secs = 30
//! ```

use std::{env, fmt, path::Path};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::{
    error::{GatewayError, Result},
    transport::HttpConfig,
};

/// Environment variable holding the gateway domain.
pub const ENV_DOMAIN: &str = "EASYPAY_DOMAIN";
/// Environment variable holding the merchant id.
pub const ENV_PID: &str = "EASYPAY_PID";
/// Environment variable holding the merchant key.
pub const ENV_KEY: &str = "EASYPAY_KEY";
/// Environment variable holding the default notify URL.
pub const ENV_NOTIFY_URL: &str = "EASYPAY_NOTIFY_URL";
/// Environment variable holding the default return URL.
pub const ENV_RETURN_URL: &str = "EASYPAY_RETURN_URL";

/// Gateway credentials and transport settings.
///
/// The merchant key is redacted from `Debug` output.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway base URL. Trailing slashes are ignored.
    pub domain: String,

    /// Merchant id (`pid`).
    pub pid: String,

    /// Merchant key shared with the gateway.
    pub key: String,

    /// Default asynchronous notification URL.
    #[serde(default)]
    pub notify_url: Option<String>,

    /// Default browser return URL.
    #[serde(default)]
    pub return_url: Option<String>,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("domain", &self.domain)
            .field("pid", &self.pid)
            .field("key", &"[REDACTED]")
            .field("notify_url", &self.notify_url)
            .field("return_url", &self.return_url)
            .field("http", &self.http)
            .finish()
    }
}

impl GatewayConfig {
    /// Creates a configuration with default HTTP settings and no callback URLs.
    ///
    /// # Examples
    ///
    /// ```
    /// use easypay::GatewayConfig;
    ///
    /// let config = GatewayConfig::new("https://pay.example.com/", "1000", "testkey")
    ///     .with_notify_url("https://shop.example.com/notify");
    /// assert_eq!(config.base_url().unwrap(), "https://pay.example.com");
    /// ```
    #[must_use]
    pub fn new(domain: impl Into<String>, pid: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            pid: pid.into(),
            key: key.into(),
            notify_url: None,
            return_url: None,
            http: HttpConfig::default(),
        }
    }

    /// Sets the default notification URL.
    #[must_use]
    pub fn with_notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = Some(url.into());
        self
    }

    /// Sets the default return URL.
    #[must_use]
    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    /// Replaces the HTTP transport settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if parsing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| GatewayError::InvalidConfig(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the file cannot be read or is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GatewayError::InvalidConfig(format!(
                "cannot read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Builds a configuration from `EASYPAY_*` environment variables.
    ///
    /// `EASYPAY_DOMAIN`, `EASYPAY_PID` and `EASYPAY_KEY` are required;
    /// `EASYPAY_NOTIFY_URL` and `EASYPAY_RETURN_URL` are optional.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if a required variable is
    /// missing or the result fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Same rules as [`GatewayConfig::from_env`]; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if a required variable is
    /// missing or the result fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| {
                GatewayError::InvalidConfig(format!("environment variable {name} is not set"))
            })
        };

        let config = Self {
            domain: require(ENV_DOMAIN)?,
            pid: require(ENV_PID)?,
            key: require(ENV_KEY)?,
            notify_url: get(ENV_NOTIFY_URL),
            return_url: get(ENV_RETURN_URL),
            http: HttpConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates credentials, domain and HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if:
    /// - `pid` or `key` is empty
    /// - `domain` is not an absolute `http`/`https` URL with a host
    /// - HTTP timeouts are out of range
    pub fn validate(&self) -> Result<()> {
        self.validated_base_url().map(drop)
    }

    /// Runs [`validate`](Self::validate) and returns the base URL.
    pub(crate) fn validated_base_url(&self) -> Result<String> {
        if self.pid.trim().is_empty() {
            return Err(GatewayError::InvalidConfig("pid must not be empty".to_owned()));
        }
        if self.key.is_empty() {
            return Err(GatewayError::InvalidConfig("key must not be empty".to_owned()));
        }
        let base_url = self.base_url()?;
        self.http.validate()?;
        Ok(base_url)
    }

    /// Returns the gateway base URL without trailing slashes.
    ///
    /// Plain `http` domains are accepted; many gateways run without TLS.
    /// A warning is logged for them since the merchant key travels in
    /// `api.php` requests.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the domain is not a valid
    /// `http`/`https` URL with a host.
    pub fn base_url(&self) -> Result<String> {
        let trimmed = self.domain.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| {
            GatewayError::InvalidConfig(format!("invalid domain '{}': {e}", self.domain))
        })?;

        match url.scheme() {
            "https" => {}
            "http" => warn!(domain = trimmed, "gateway domain does not use HTTPS"),
            other => {
                return Err(GatewayError::InvalidConfig(format!(
                    "domain must use http or https, got: {other}"
                )));
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(GatewayError::InvalidConfig(format!(
                "domain has no host: {}",
                self.domain
            )));
        }

        Ok(trimmed.to_owned())
    }
}
