//! Signing key records and the key set document
//!
//! The authorization server publishes its current public signing keys as a
//! JSON document of the form `{"keys": [...]}`. Each usable entry carries a
//! key id, the signing algorithm, the intended use, and the RSA public
//! components. The document is untrusted input: entries that are not usable
//! verification keys (encryption keys, unknown algorithms, missing
//! components) are skipped with a warning rather than failing the whole
//! document.

use aliri_braid::braid;
use serde::{Deserialize, Serialize};

use super::{b64, error::AuthError, Algorithm};

/// An identifier for a signing key
#[braid(serde, ref_doc = "A borrowed reference to a [`KeyId`]")]
pub struct KeyId;

/// The intended use of a key in the key set
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyUse {
    /// The key is used for signature verification
    #[serde(rename = "sig")]
    Signing,
}

/// A public signing key record
///
/// Holds the RSA public components needed to reconstruct a verification key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    kid: KeyId,
    alg: Algorithm,
    #[serde(rename = "use")]
    usage: KeyUse,
    #[serde(with = "b64")]
    n: Vec<u8>,
    #[serde(with = "b64")]
    e: Vec<u8>,
}

impl Jwk {
    /// Constructs a signing key record from raw RSA public components
    pub fn from_components(kid: KeyId, modulus: Vec<u8>, exponent: Vec<u8>) -> Self {
        Self {
            kid,
            alg: Algorithm::Rs256,
            usage: KeyUse::Signing,
            n: modulus,
            e: exponent,
        }
    }

    /// The key's identifier
    pub fn kid(&self) -> &KeyIdRef {
        &self.kid
    }

    /// The algorithm this key verifies
    pub fn algorithm(&self) -> Algorithm {
        self.alg
    }

    /// Verifies `signature` over `message` with this key
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidSignature`] if the signature does not
    /// verify.
    pub fn verify_signature(&self, message: &[u8], signature: &[u8]) -> Result<(), AuthError> {
        let components = ring::signature::RsaPublicKeyComponents {
            n: &self.n,
            e: &self.e,
        };

        components
            .verify(self.alg.verification_params(), message, signature)
            .map_err(|_| AuthError::InvalidSignature)
    }
}

/// A set of public signing keys, as published by the authorization server
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    #[serde(deserialize_with = "deserialize_keys")]
    keys: Vec<Jwk>,
}

impl Jwks {
    /// Adds a key to the set
    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    /// A view of the keys in this set
    pub fn keys(&self) -> &[Jwk] {
        &self.keys
    }

    pub(crate) fn into_keys(self) -> Vec<Jwk> {
        self.keys
    }
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<Jwk>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeJwk {
        Jwk(Jwk),
        Unknown(JwkLike),
    }

    #[derive(Deserialize)]
    struct JwkLike {
        #[serde(default)]
        kid: Option<KeyId>,
        #[serde(rename = "use", default)]
        r#use: Option<String>,
        #[serde(default)]
        alg: Option<String>,
    }

    let entries = Vec::<MaybeJwk>::deserialize(deserializer)?;

    let keys = entries
        .into_iter()
        .filter_map(|entry| match entry {
            MaybeJwk::Jwk(jwk) => Some(jwk),
            MaybeJwk::Unknown(key) => {
                tracing::warn!(
                    jwk.kid = ?key.kid,
                    "jwk.use" = ?key.r#use,
                    jwk.alg = ?key.alg,
                    "ignoring unusable JWK"
                );
                None
            }
        })
        .collect();

    Ok(keys)
}
