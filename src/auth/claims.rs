//! The verified claim set
//!
//! The decoded payload of a token. Untrusted until verification succeeds;
//! treated as read-only afterwards. Known claims are typed; everything else
//! the authorization server included rides along in `extra` so protected
//! operations see the full claim set.

use aliri_braid::braid;
use aliri_clock::UnixTime;
use serde::{Deserialize, Serialize};

use super::policy::Permissions;

/// An issuer of tokens
#[braid(serde, ref_doc = "A borrowed reference to an [`Issuer`]")]
pub struct Issuer;

/// An audience
#[braid(serde, ref_doc = "A borrowed reference to an [`Audience`]")]
pub struct Audience;

/// The wire shape of the `aud` claim
///
/// Authorization servers emit a bare string when a token has exactly one
/// audience and an array otherwise; both shapes must land in the same set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum AudClaim {
    One(Audience),
    Many(Vec<Audience>),
}

/// The audiences a token was minted for
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AudClaim", into = "AudClaim")]
#[must_use]
pub struct Audiences(Vec<Audience>);

impl Audiences {
    /// Indicates whether the audience set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the set names the given audience
    #[must_use]
    pub fn contains(&self, audience: &AudienceRef) -> bool {
        self.iter().any(|aud| aud == audience)
    }

    /// Iterates over the audiences in the set
    pub fn iter(&self) -> impl Iterator<Item = &AudienceRef> {
        self.0.iter().map(AsRef::as_ref)
    }
}

impl From<AudClaim> for Audiences {
    fn from(claim: AudClaim) -> Self {
        match claim {
            AudClaim::One(aud) => Self(vec![aud]),
            AudClaim::Many(auds) => Self(auds),
        }
    }
}

impl From<Audiences> for AudClaim {
    fn from(mut set: Audiences) -> Self {
        if set.0.len() == 1 {
            Self::One(set.0.remove(0))
        } else {
            Self::Many(set.0)
        }
    }
}

impl From<Vec<Audience>> for Audiences {
    fn from(auds: Vec<Audience>) -> Self {
        Self(auds)
    }
}

impl From<Audience> for Audiences {
    fn from(aud: Audience) -> Self {
        Self(vec![aud])
    }
}

/// The claim set decoded from a verified token
///
/// Created per request and discarded when the request completes; never
/// stored and never shared across requests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Audiences::is_empty")]
    aud: Audiences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    permissions: Option<Permissions>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Constructs a new, empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiration, in seconds since the Unix epoch
    pub fn exp(&self) -> Option<UnixTime> {
        self.exp
    }

    /// The token's issuer
    pub fn iss(&self) -> Option<&IssuerRef> {
        self.iss.as_deref()
    }

    /// The audiences the token was minted for
    pub fn aud(&self) -> &Audiences {
        &self.aud
    }

    /// The permission set granted to the bearer, if the claim was present
    pub fn permissions(&self) -> Option<&Permissions> {
        self.permissions.as_ref()
    }

    /// Any other claim the token carried, by name
    pub fn get(&self, claim: &str) -> Option<&serde_json::Value> {
        self.extra.get(claim)
    }

    /// Sets the `exp` claim
    pub fn with_expiration(mut self, time: UnixTime) -> Self {
        self.exp = Some(time);
        self
    }

    /// Sets the `iss` claim
    pub fn with_issuer(mut self, iss: impl Into<Issuer>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Sets the `aud` claim
    pub fn with_audiences(mut self, aud: impl Into<Audiences>) -> Self {
        self.aud = aud.into();
        self
    }

    /// Sets the `permissions` claim
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }
}
