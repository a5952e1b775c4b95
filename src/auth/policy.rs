//! Permission enforcement against a verified claim set
//!
//! Membership is exact-string and case-sensitive. There is no hierarchy, no
//! wildcards, and no inheritance.

use std::collections::HashSet;

use aliri_braid::braid;
use serde::{Deserialize, Serialize};

use super::{claims::Claims, error::AuthError};

/// A single permission, such as `get:drinks-detail`
#[braid(serde, ref_doc = "A borrowed reference to a [`Permission`]")]
pub struct Permission;

/// The set of permissions claimed by a token
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct Permissions(HashSet<Permission>);

impl Permissions {
    /// An empty permission set
    pub fn new() -> Self {
        Self::default()
    }

    /// A permission set holding a single permission
    pub fn single(permission: impl Into<Permission>) -> Self {
        Self(HashSet::from([permission.into()]))
    }

    /// Whether the set contains exactly the given permission
    #[must_use]
    pub fn contains(&self, permission: &PermissionRef) -> bool {
        self.0.contains(permission)
    }

    /// Indicates whether the permission set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates through references to the permissions in the set
    pub fn iter(&self) -> impl Iterator<Item = &PermissionRef> {
        self.0.iter().map(AsRef::as_ref)
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Permission> for Permissions {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Decides whether a verified claim set grants the required permission
///
/// # Errors
///
/// Returns [`AuthError::PermissionsClaimMissing`] when the claim set has no
/// `permissions` entry at all, and [`AuthError::PermissionDenied`] when the
/// claimed set does not include `required`.
pub fn check(claims: &Claims, required: &PermissionRef) -> Result<(), AuthError> {
    let permissions = claims
        .permissions()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if !permissions.contains(required) {
        tracing::debug!(%required, "permission not present in claimed set");
        return Err(AuthError::PermissionDenied);
    }

    Ok(())
}
