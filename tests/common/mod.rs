#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use barkeep::auth::{Audience, Authority, Issuer, Jwk, Jwks, Jwt, KeyId, KeyStore};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use openssl::{
    hash::MessageDigest,
    pkey::{PKey, Private},
    rsa::Rsa,
    sign::Signer,
};

pub const ISSUER: &str = "https://issuer.example.com/";
pub const AUDIENCE: &str = "drinks";

/// An RSA signing key that can mint tokens the verifier should accept
pub struct TestKey {
    kid: String,
    pkey: PKey<Private>,
    jwk: Jwk,
}

impl TestKey {
    pub fn generate(kid: &str) -> Self {
        let rsa = Rsa::generate(2048).unwrap();
        let jwk = Jwk::from_components(KeyId::new(kid.to_string()), rsa.n().to_vec(), rsa.e().to_vec());
        let pkey = PKey::from_rsa(rsa).unwrap();

        Self {
            kid: kid.to_owned(),
            pkey,
            jwk,
        }
    }

    pub fn jwk(&self) -> Jwk {
        self.jwk.clone()
    }

    /// Signs `claims` under an `RS256` header naming this key
    pub fn sign(&self, claims: &serde_json::Value) -> Jwt {
        let header = serde_json::json!({"alg": "RS256", "typ": "JWT", "kid": self.kid});
        self.sign_with_header(&header, claims)
    }

    /// Signs `claims` under an arbitrary header
    pub fn sign_with_header(&self, header: &serde_json::Value, claims: &serde_json::Value) -> Jwt {
        let message = format!(
            "{}.{}",
            b64(header.to_string().as_bytes()),
            b64(claims.to_string().as_bytes())
        );

        let mut signer = Signer::new(MessageDigest::sha256(), &self.pkey).unwrap();
        signer.update(message.as_bytes()).unwrap();
        let signature = signer.sign_to_vec().unwrap();

        Jwt::new(format!("{message}.{}", b64(&signature)))
    }
}

pub fn b64(raw: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(raw)
}

/// An authority trusting the given keys, with the standard test expectations
pub fn authority_with(keys: &[&TestKey]) -> Authority {
    let mut jwks = Jwks::default();
    for key in keys {
        jwks.add_key(key.jwk());
    }

    Authority::new(
        KeyStore::new(jwks),
        Issuer::new(ISSUER.to_string()),
        Audience::new(AUDIENCE.to_string()),
    )
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// A claim set that passes every verification stage
pub fn good_claims() -> serde_json::Value {
    serde_json::json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": unix_now() + 3600,
    })
}

/// [`good_claims`] plus a `permissions` claim
pub fn claims_with_permissions(permissions: &[&str]) -> serde_json::Value {
    let mut claims = good_claims();
    claims["permissions"] = serde_json::json!(permissions);
    claims
}
