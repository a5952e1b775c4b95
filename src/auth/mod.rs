//! Role-scoped bearer-token authorization
//!
//! The authorization chain runs Guard → Extractor → Verifier (consulting the
//! key set cache) → Enforcer. Each stage either produces the input the next
//! stage needs or short-circuits with a classified [`AuthError`]. The chain
//! fails closed: when trust cannot be established, the outcome is denial.

pub mod algorithm;
pub mod authority;
mod b64;
pub mod claims;
pub mod error;
pub mod guard;
pub mod jwks;
pub mod key_store;
pub mod policy;
pub mod token;

pub use algorithm::Algorithm;
pub use authority::Authority;
pub use claims::{Audience, AudienceRef, Audiences, Claims, Issuer, IssuerRef};
pub use error::AuthError;
pub use guard::{GuardPolicy, Verified};
pub use jwks::{Jwk, Jwks, KeyId, KeyIdRef, KeyUse};
pub use key_store::KeyStore;
pub use policy::{Permission, PermissionRef, Permissions};
pub use token::{extract, Jwt, JwtRef};
