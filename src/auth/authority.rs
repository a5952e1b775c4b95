//! The token verifier
//!
//! Composes the key store with the configured issuer and audience
//! expectations. Verification is a fixed pipeline; every stage fails fast
//! with its own distinct error kind so callers can tell a broken token from
//! an unavailable key set from an expired credential.

use std::sync::Arc;

use super::{
    claims::{Audience, Claims, Issuer},
    error::AuthError,
    key_store::KeyStore,
    policy::{self, PermissionRef},
    token::{self, JwtRef},
    b64,
};
use aliri_clock::{Clock, System};

#[derive(Debug)]
struct Inner {
    keys: KeyStore,
    issuer: Issuer,
    audience: Audience,
}

/// Verifies bearer tokens against the trusted key set and claim expectations
///
/// Cheap to clone and safe to share across concurrent requests.
#[derive(Clone, Debug)]
#[must_use]
pub struct Authority {
    inner: Arc<Inner>,
}

impl Authority {
    /// Constructs an authority over a key store and expected claim values
    pub fn new(keys: KeyStore, issuer: Issuer, audience: Audience) -> Self {
        Self {
            inner: Arc::new(Inner {
                keys,
                issuer,
                audience,
            }),
        }
    }

    /// The underlying key store
    pub fn key_store(&self) -> &KeyStore {
        &self.inner.keys
    }

    /// Runs the full authorization chain for a raw `Authorization` header
    ///
    /// Extraction, verification, and permission enforcement in order; the
    /// first failure wins and the protected operation must not run.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`AuthError`] in the chain.
    pub async fn authorize(
        &self,
        raw_header: Option<&str>,
        required: &PermissionRef,
    ) -> Result<Claims, AuthError> {
        let token = token::extract(raw_header)?;
        let claims = self.verify(token).await?;
        policy::check(&claims, required)?;
        Ok(claims)
    }

    /// Verifies a token's signature and standard claims
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] naming the first stage that rejected the
    /// token.
    pub async fn verify(&self, token: &JwtRef) -> Result<Claims, AuthError> {
        self.verify_with_clock(token, &System).await
    }

    /// Verifies a token, telling time with the provided clock
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] naming the first stage that rejected the
    /// token.
    pub async fn verify_with_clock<C: Clock>(
        &self,
        token: &JwtRef,
        clock: &C,
    ) -> Result<Claims, AuthError> {
        let decomposed = token::decompose(token)?;

        let key = self
            .inner
            .keys
            .get_or_refresh(decomposed.header.kid())
            .await?;

        let signature =
            b64::decode(decomposed.signature).map_err(|_| AuthError::InvalidSignature)?;
        key.verify_signature(decomposed.message.as_bytes(), &signature)?;

        // Signature verified; the payload can now be decoded and judged.
        let payload = b64::decode(decomposed.payload).map_err(|_| AuthError::InvalidHeader)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidHeader)?;

        self.validate_claims(&claims, clock)?;

        Ok(claims)
    }

    fn validate_claims<C: Clock>(&self, claims: &Claims, clock: &C) -> Result<(), AuthError> {
        let now = clock.now();

        // A token without an expiration fails closed.
        match claims.exp() {
            Some(exp) if exp > now => {}
            _ => {
                tracing::debug!("token expiration absent or not in the future");
                return Err(AuthError::TokenExpired);
            }
        }

        match claims.iss() {
            Some(iss) if iss == &*self.inner.issuer => {}
            _ => {
                tracing::debug!(expected = %self.inner.issuer, "token issuer mismatch");
                return Err(AuthError::InvalidIssuer);
            }
        }

        if !claims.aud().contains(&self.inner.audience) {
            tracing::debug!(expected = %self.inner.audience, "token audience mismatch");
            return Err(AuthError::InvalidAudience);
        }

        Ok(())
    }
}
