//! Bearer token extraction and structural decomposition
//!
//! A bearer token is an opaque, URL-safe string of three dot-separated
//! segments (header, payload, signature). Extraction pulls it out of the
//! `Authorization` header without decoding anything; decomposition splits it
//! apart and decodes only the header segment, which is exactly enough to
//! elect the verification key. Nothing here is trusted until the signature
//! verifies.

use std::fmt;

use aliri_braid::braid;
use serde::Deserialize;

use super::{b64, error::AuthError, jwks::KeyId, Algorithm};

/// A compact bearer token
///
/// This type provides redacting [`Display`][JwtRef#impl-Display] and
/// [`Debug`][JwtRef#impl-Debug] implementations to prevent unintentional
/// disclosure of credentials in logs.
#[braid(
    serde,
    debug = "owned",
    display = "owned",
    ord = "omit",
    ref_doc = "A borrowed reference to a bearer token ([`Jwt`])"
)]
#[must_use]
pub struct Jwt;

impl fmt::Debug for JwtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(concat!("***", "JWT", "***"))
    }
}

impl fmt::Display for JwtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(concat!("***", "JWT", "***"))
    }
}

/// Pulls the bearer token out of a raw `Authorization` header value
///
/// The header must have the exact two-part form `Bearer <token>`: a
/// case-sensitive scheme keyword, exactly one space, a non-empty token, and
/// nothing else. Ambiguous shapes are rejected rather than guessed at.
///
/// # Errors
///
/// Returns [`AuthError::MissingHeader`] when no header was presented and
/// [`AuthError::MalformedHeader`] for any other shape.
pub fn extract(raw_header: Option<&str>) -> Result<&JwtRef, AuthError> {
    let raw = raw_header.ok_or(AuthError::MissingHeader)?;

    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(JwtRef::from_str(token)),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// The declared (unverified) metadata from a token's header segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenHeader {
    alg: Algorithm,
    kid: KeyId,
}

impl TokenHeader {
    /// The declared signing algorithm
    pub fn alg(&self) -> Algorithm {
        self.alg
    }

    /// The id of the key that purportedly signed this token
    pub fn kid(&self) -> &super::jwks::KeyIdRef {
        &self.kid
    }
}

/// A token split into its parts, ready for verification
///
/// The payload has not been decoded and the header has not been
/// authenticated; an adversary can place arbitrary data in both.
#[derive(Clone, Debug)]
#[must_use]
pub(crate) struct Decomposed<'a> {
    pub(crate) header: TokenHeader,
    pub(crate) message: &'a str,
    pub(crate) payload: &'a str,
    pub(crate) signature: &'a str,
}

macro_rules! expect_two {
    ($iter:expr) => {{
        let mut i = $iter;
        match (i.next(), i.next(), i.next()) {
            (Some(first), Some(second), None) => Some((first, second)),
            _ => None,
        }
    }};
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    kid: Option<KeyId>,
}

/// Splits a token into its segments and validates the header segment
///
/// # Errors
///
/// Returns [`AuthError::InvalidHeader`] if the token is not three segments
/// or the header segment is not decodable JSON naming both `kid` and `alg`,
/// and [`AuthError::UnsupportedAlgorithm`] if the declared algorithm is not
/// trusted. The signature segment is deliberately left undecoded so that an
/// unsupported algorithm is rejected before any signature work happens.
pub(crate) fn decompose(token: &JwtRef) -> Result<Decomposed<'_>, AuthError> {
    let (signature, message) =
        expect_two!(token.as_str().rsplitn(2, '.')).ok_or(AuthError::InvalidHeader)?;
    let (payload, header_segment) =
        expect_two!(message.rsplitn(2, '.')).ok_or(AuthError::InvalidHeader)?;

    let header_raw = b64::decode(header_segment).map_err(|_| AuthError::InvalidHeader)?;
    let header: RawHeader =
        serde_json::from_slice(&header_raw).map_err(|_| AuthError::InvalidHeader)?;

    let alg_name = header.alg.ok_or(AuthError::InvalidHeader)?;
    let kid = header.kid.ok_or(AuthError::InvalidHeader)?;
    let alg = Algorithm::from_name(&alg_name)?;

    Ok(Decomposed {
        header: TokenHeader { alg, kid },
        message,
        payload,
        signature,
    })
}
