//! Bearer-token authorization for the drinks API
//!
//! The core of this crate is the authorization chain in [`auth`]: a typed
//! pipeline that turns a raw `Authorization` header into a verified claim
//! set or a classified denial. The rest of the crate is the thin HTTP
//! resource it protects: an in-memory drinks catalog served over axum.
//!
//! Trust only ever flows forward: the [extractor](auth::extract) produces an
//! opaque token, the [verifier](auth::Authority) produces verified claims,
//! and the [enforcer](auth::policy::check) produces a yes/no decision. No
//! later stage re-derives an earlier stage's judgment, and any failure stops
//! the protected operation from running.

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod store;
