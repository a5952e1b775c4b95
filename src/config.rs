//! Startup configuration
//!
//! The expected issuer and audience and the key set URL depend on the
//! deployment's identity provider, so they are supplied at startup rather
//! than baked in.

use std::net::SocketAddr;

use clap::Parser;

/// Configuration for the drinks API
#[derive(Debug, Parser)]
#[command(name = "barkeep", version, about)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "BARKEEP_LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// Issuer expected in the `iss` claim of verified tokens
    #[arg(long, env = "BARKEEP_ISSUER")]
    pub issuer: String,

    /// Audience expected in the `aud` claim of verified tokens
    #[arg(long, env = "BARKEEP_AUDIENCE")]
    pub audience: String,

    /// URL of the authorization server's JWKS document
    #[arg(long, env = "BARKEEP_JWKS_URL")]
    pub jwks_url: String,

    /// Timeout for key set fetches, in seconds
    #[arg(long, env = "BARKEEP_JWKS_TIMEOUT_SECS", default_value_t = 10)]
    pub jwks_timeout_secs: u64,

    /// Interval between background key set refreshes, in seconds
    #[arg(long, env = "BARKEEP_JWKS_REFRESH_SECS", default_value_t = 300)]
    pub jwks_refresh_secs: u64,
}
