//! The authorization failure taxonomy
//!
//! Every stage of the authorization chain fails with exactly one of these
//! kinds. Callers match on the kind, never on the message text: the kinds
//! map to different remediation advice ("your token is broken" vs. "our key
//! set is unavailable" vs. "your token expired"), so collapsing them into a
//! coarser error would be a correctness bug, not a cosmetic one.

use http::StatusCode;
use thiserror::Error;

/// A classified authorization failure
///
/// Extraction and verification failures are 401s; permission failures are
/// 403s. An unavailable key set also maps to 401: when trust cannot be
/// established, the request is treated as untrusted rather than admitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
pub enum AuthError {
    /// No `Authorization` header was presented
    #[error("authorization header is expected")]
    MissingHeader,

    /// The `Authorization` header is not of the exact form `Bearer <token>`
    #[error("authorization header must be of the form 'Bearer <token>'")]
    MalformedHeader,

    /// The token is not three dot-separated segments with a decodable
    /// header naming a key id and algorithm
    #[error("token is malformed")]
    InvalidHeader,

    /// The token declares an algorithm other than the one this service
    /// trusts
    #[error("token algorithm is not supported")]
    UnsupportedAlgorithm,

    /// No key in the current key set matches the token's key id
    #[error("no key found to verify token")]
    UnknownKey,

    /// The token's signature does not verify under the matched key
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token's expiration is absent or not in the future
    #[error("token is expired")]
    TokenExpired,

    /// The token's issuer does not match the expected issuer
    #[error("token issuer is invalid")]
    InvalidIssuer,

    /// The token's audience does not include the expected audience
    #[error("token audience is invalid")]
    InvalidAudience,

    /// The token carries no `permissions` claim at all
    ///
    /// Distinct from an empty permission set: a correctly configured
    /// authorization server always includes the claim, so its total absence
    /// indicates misconfiguration rather than ordinary denial.
    #[error("permissions claim is missing from token")]
    PermissionsClaimMissing,

    /// The claimed permission set does not include the required permission
    #[error("permission not granted")]
    PermissionDenied,

    /// The key set source was unreachable or returned a malformed document
    #[error("signing key set is unavailable")]
    KeySetUnavailable,
}

impl AuthError {
    /// The HTTP status this failure maps to at the boundary
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PermissionsClaimMissing | Self::PermissionDenied => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// The stable, machine-readable code for this failure
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::InvalidHeader => "invalid_header",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::UnknownKey => "unknown_key",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidAudience => "invalid_audience",
            Self::PermissionsClaimMissing => "permissions_claim_missing",
            Self::PermissionDenied => "permission_denied",
            Self::KeySetUnavailable => "key_set_unavailable",
        }
    }
}
