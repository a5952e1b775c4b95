//! Endpoint guards
//!
//! A guard wraps a protected handler so the authorization chain runs to
//! completion before any business logic executes. Guards are declared with
//! [`permission_guards!`](crate::permission_guards) and used as axum
//! extractors: the handler receives the verified claim set, never the raw
//! token, and a failed chain short-circuits into the uniform error envelope.
//!
//! ```ignore
//! crate::permission_guards! {
//!     pub guard PostDrinks = "post:drinks";
//! }
//!
//! async fn create_drink(guard: Verified<PostDrinks>) -> ... {
//!     let claims = guard.claims();
//!     // only reached after extract -> verify -> enforce succeeded
//! }
//! ```

use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
};
use http::request::Parts;

use super::{authority::Authority, claims::Claims, error::AuthError, policy::PermissionRef};

/// The permission an endpoint guard enforces
pub trait GuardPolicy {
    /// The exact permission string a token must claim
    const PERMISSION: &'static str;
}

/// A verified claim set, obtained by enforcing the policy `P`
///
/// Constructed only by the extractor, which asserts that extraction,
/// verification, and enforcement all succeeded for this request.
#[derive(Clone, Debug)]
#[must_use]
pub struct Verified<P> {
    claims: Claims,
    _policy: PhantomData<fn() -> P>,
}

impl<P> Verified<P> {
    /// The verified token claims
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Extracts the claims from the guard
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S, P> FromRequestParts<S> for Verified<P>
where
    S: Send + Sync,
    Authority: FromRef<S>,
    P: GuardPolicy,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authority = Authority::from_ref(state);

        let raw_header = match parts.headers.get(http::header::AUTHORIZATION) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        };

        let claims = authority
            .authorize(raw_header, PermissionRef::from_str(P::PERMISSION))
            .await?;

        Ok(Self {
            claims,
            _policy: PhantomData,
        })
    }
}

/// Declares endpoint guard policies
///
/// Each declaration produces a unit type implementing
/// [`GuardPolicy`](crate::auth::guard::GuardPolicy), for use as
/// `Verified<Name>` in a handler signature.
#[macro_export]
macro_rules! permission_guards {
    ($($(#[$meta:meta])* $v:vis guard $name:ident = $permission:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            $v struct $name;

            impl $crate::auth::guard::GuardPolicy for $name {
                const PERMISSION: &'static str = $permission;
            }
        )*
    };
}
