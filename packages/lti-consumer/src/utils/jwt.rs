use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Map, Value};

use crate::error::LtiError;

/// Signs messages with the platform private key.
#[derive(Clone)]
pub struct PlatformKeyHandler {
    key: EncodingKey,
    key_id: String,
}

impl PlatformKeyHandler {
    pub fn new(private_key_pem: &str, key_id: &str) -> Result<Self, LtiError> {
        Ok(Self {
            key: EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?,
            key_id: key_id.to_owned(),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Add `iat`/`exp` to `message` and sign it as an RS256 JWT.
    pub fn encode_and_sign(
        &self,
        mut message: Map<String, Value>,
        expiration_secs: i64,
    ) -> Result<String, LtiError> {
        let now = Utc::now().timestamp();
        message.insert("iat".into(), now.into());
        message.insert("exp".into(), (now + expiration_secs).into());

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());

        Ok(encode(&header, &message, &self.key)?)
    }
}

/// Verifies JWTs signed by the tool.
#[derive(Clone)]
pub struct ToolKeyHandler {
    key: DecodingKey,
}

impl ToolKeyHandler {
    pub fn new(public_key_pem: &str) -> Result<Self, LtiError> {
        Ok(Self {
            key: DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?,
        })
    }

    /// Verify signature and expiry; the audience is not checked.
    pub fn validate_and_decode(&self, token: &str) -> Result<Map<String, Value>, LtiError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        let data = decode::<Map<String, Value>>(token, &self.key, &validation)?;
        Ok(data.claims)
    }
}
