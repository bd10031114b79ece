//! MD5 signature generation and verification.

use std::fmt;

use tracing::instrument;
use url::form_urlencoded;

use crate::{
    params::{ParamValue, Params},
    sign::{SIGN_FIELD, SIGN_TYPE_FIELD, SignType, is_reserved},
};

/// Signs and verifies EasyPay parameter sets with the merchant key.
///
/// The key is never printed by `Debug`.
#[derive(Clone)]
pub struct Md5Signer {
    key: String,
}

impl fmt::Debug for Md5Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Md5Signer").field("key", &"[REDACTED]").finish()
    }
}

impl Md5Signer {
    /// Creates a signer for the given merchant key.
    ///
    /// # Examples
    ///
    /// ```
    /// use easypay::sign::Md5Signer;
    ///
    /// let signer = Md5Signer::new("testkey");
    /// assert!(!format!("{signer:?}").contains("testkey"));
    /// ```
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Merchant key, for `api.php` calls that authenticate with it directly.
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    /// Builds the canonical string for a parameter set.
    ///
    /// Drops `sign`, `sign_type` and empty values, then joins the rest as
    /// `key=value` pairs with `&` in byte-wise key order. Values are not
    /// URL-encoded.
    ///
    /// # Examples
    ///
    /// ```
    /// use easypay::{params::Params, sign::Md5Signer};
    ///
    /// let params: Params = [("type", "alipay"), ("money", "1.00"), ("sign", "x"), ("name", "")]
    ///     .into_iter()
    ///     .collect();
    /// assert_eq!(Md5Signer::canonical_string(&params), "money=1.00&type=alipay");
    /// ```
    #[must_use]
    pub fn canonical_string(params: &Params) -> String {
        let mut canonical = String::new();
        for (key, value) in signable(params) {
            if !canonical.is_empty() {
                canonical.push('&');
            }
            canonical.push_str(key);
            canonical.push('=');
            canonical.push_str(&value.to_string());
        }
        canonical
    }

    /// Computes the signature of a parameter set.
    ///
    /// Lowercase hex MD5 of the canonical string with the key appended
    /// directly, without a separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use easypay::{params::Params, sign::Md5Signer};
    ///
    /// let params: Params = [("a", "1"), ("b", "2")].into_iter().collect();
    /// let signer = Md5Signer::new("secret");
    /// assert_eq!(signer.sign(&params), "8d9f51949e440aa629fd1a035708473a");
    /// ```
    #[must_use]
    pub fn sign(&self, params: &Params) -> String {
        let mut input = Self::canonical_string(params);
        input.push_str(&self.key);
        format!("{:x}", md5::compute(input.as_bytes()))
    }

    /// Signs a parameter set and assembles the outgoing payload.
    ///
    /// The payload holds the filtered, sorted parameters followed by `sign`
    /// and `sign_type`. Caller-supplied `sign`/`sign_type` values are
    /// discarded.
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    #[must_use]
    pub fn sign_params(&self, params: &Params) -> SignedParams {
        let signature = self.sign(params);
        let mut pairs: Vec<(String, String)> = signable(params)
            .map(|(k, v)| (k.to_owned(), v.to_string()))
            .collect();
        pairs.push((SIGN_FIELD.to_owned(), signature));
        pairs.push((SIGN_TYPE_FIELD.to_owned(), SignType::Md5.as_str().to_owned()));
        SignedParams { pairs }
    }

    /// Verifies the signature carried by a parameter set.
    ///
    /// Used for gateway callbacks to `notify_url` and `return_url`. The
    /// carried `sign` is compared case-insensitively with a fresh signature
    /// over the remaining fields. A missing `sign`, or a `sign_type` other
    /// than MD5, fails verification.
    ///
    /// # Examples
    ///
    /// ```
    /// use easypay::{params::Params, sign::Md5Signer};
    ///
    /// let signer = Md5Signer::new("secret");
    /// let mut params: Params = [("a", "1"), ("b", "2")].into_iter().collect();
    /// params.insert("sign", signer.sign(&params));
    /// params.insert("sign_type", "MD5");
    /// assert!(signer.verify(&params));
    ///
    /// params.insert("b", "3");
    /// assert!(!signer.verify(&params));
    /// ```
    #[must_use]
    pub fn verify(&self, params: &Params) -> bool {
        if let Some(sign_type) = params.get(SIGN_TYPE_FIELD)
            && !sign_type.is_empty()
            && !sign_type.to_string().eq_ignore_ascii_case(SignType::Md5.as_str())
        {
            return false;
        }

        match params.get(SIGN_FIELD) {
            Some(ParamValue::Text(received)) if !received.is_empty() => {
                self.sign(params).eq_ignore_ascii_case(received)
            }
            _ => false,
        }
    }
}

/// Entries that take part in signing, in key order.
fn signable(params: &Params) -> impl Iterator<Item = (&str, &ParamValue)> {
    params.non_empty().filter(|(k, _)| !is_reserved(k))
}

/// Signed outgoing payload: filtered parameters plus `sign` and `sign_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParams {
    pairs: Vec<(String, String)>,
}

impl SignedParams {
    /// Returns the payload as ordered key/value pairs.
    #[must_use]
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Consumes the payload and returns its pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Returns the value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Returns the computed signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        self.get(SIGN_FIELD).unwrap_or_default()
    }

    /// Renders the payload as an `application/x-www-form-urlencoded` string.
    #[must_use]
    pub fn to_form_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.pairs).finish()
    }
}
