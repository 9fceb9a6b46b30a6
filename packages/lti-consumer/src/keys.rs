//! Platform RSA key material for LTI 1.3.
//!
//! The platform signs launch messages and access tokens with a private key
//! that is stored as PKCS#1 PEM. Its public half is published as a JWK whose
//! serialization depends only on the private key and the key id.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{Value, json};
use tracing::info;

use crate::error::LtiError;

/// Freshly generated key material, ready to be stored on a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformKeys {
    pub private_key_pem: String,
    pub key_id: String,
    pub public_jwk: String,
}

/// Generate a new RSA key pair with a random key id.
pub fn generate_platform_keys(bits: usize) -> Result<PlatformKeys, LtiError> {
    let key = RsaPrivateKey::new(&mut OsRng, bits)?;
    let key_id = uuid::Uuid::new_v4().to_string();
    let private_key_pem = key.to_pkcs1_pem(LineEnding::LF)?.to_string();
    let public_jwk = serialize_jwk(&jwk_from_key(&key, &key_id))?;

    info!(kid = %key_id, bits, "Generated LTI 1.3 platform key");

    Ok(PlatformKeys {
        private_key_pem,
        key_id,
        public_jwk,
    })
}

/// Re-derive the stored public JWK text from a PEM private key.
pub fn public_jwk_from_private_pem(
    private_key_pem: &str,
    key_id: &str,
) -> Result<String, LtiError> {
    let key = RsaPrivateKey::from_pkcs1_pem(private_key_pem)?;
    serialize_jwk(&jwk_from_key(&key, key_id))
}

/// SubjectPublicKeyInfo PEM of the public half of a PEM private key.
pub fn public_pem_from_private_pem(private_key_pem: &str) -> Result<String, LtiError> {
    let key = RsaPrivateKey::from_pkcs1_pem(private_key_pem)?;
    RsaPublicKey::from(&key)
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| LtiError::Key(e.to_string()))
}

/// Public JWK of an RSA key, as published in the platform keyset.
pub fn jwk_from_key(key: &RsaPrivateKey, key_id: &str) -> Value {
    json!({
        "kty": "RSA",
        "alg": "RS256",
        "use": "sig",
        "kid": key_id,
        "e": URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
        "n": URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
    })
}

// serde_json maps are ordered by key, so this text is stable for a given key.
fn serialize_jwk(jwk: &Value) -> Result<String, LtiError> {
    Ok(serde_json::to_string(jwk)?)
}

/// Wrap a single public JWK into a JWKS document.
pub fn keyset(jwk: Value) -> Value {
    json!({ "keys": [jwk] })
}
