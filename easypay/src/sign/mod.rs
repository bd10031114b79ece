//! EasyPay request signing.
//!
//! Every signed request carries `sign` (MD5 over the canonical string plus
//! the merchant key) and `sign_type`. The canonical string is the parameter
//! set with `sign`, `sign_type` and empty values removed, sorted by key, and
//! joined as `k1=v1&k2=v2`.

pub mod signer;

pub use signer::{Md5Signer, SignedParams};

/// Name of the signature field.
pub const SIGN_FIELD: &str = "sign";

/// Name of the signature-type field.
pub const SIGN_TYPE_FIELD: &str = "sign_type";

/// Returns `true` for field names that never take part in signing.
#[must_use]
pub fn is_reserved(key: &str) -> bool {
    key == SIGN_FIELD || key == SIGN_TYPE_FIELD
}

/// Signature algorithm advertised in `sign_type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignType {
    /// MD5 over the canonical string with the key appended.
    #[default]
    Md5,
}

impl SignType {
    /// Returns the wire value of this signature type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
        }
    }
}
