//! The signing algorithm this service trusts
//!
//! The service accepts exactly one asymmetric algorithm family. Keeping the
//! type a single-variant enum makes verification with `none` or a symmetric
//! algorithm unrepresentable rather than merely checked at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// A token signing algorithm accepted by this service
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    #[serde(rename = "RS256")]
    Rs256,
}

impl Algorithm {
    /// Resolves a declared algorithm name
    ///
    /// # Errors
    ///
    /// Any name other than `RS256` is rejected with
    /// [`AuthError::UnsupportedAlgorithm`].
    pub fn from_name(name: &str) -> Result<Self, AuthError> {
        match name {
            "RS256" => Ok(Self::Rs256),
            _ => Err(AuthError::UnsupportedAlgorithm),
        }
    }

    pub(crate) fn verification_params(self) -> &'static ring::signature::RsaParameters {
        match self {
            Self::Rs256 => &ring::signature::RSA_PKCS1_2048_8192_SHA256,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Rs256 => f.write_str("RS256"),
        }
    }
}
