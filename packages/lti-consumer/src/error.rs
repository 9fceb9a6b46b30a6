use sea_orm::DbErr;
use thiserror::Error;

use crate::entity::lti_configuration::ConfigStore;

/// Errors raised by the LTI consumer models and protocol consumers.
#[derive(Debug, Error)]
pub enum LtiError {
    /// The configuration has no location, so its block cannot be resolved.
    #[error("Block location not set, it's not possible to retrieve the block")]
    MissingLocation,

    /// Launch settings can only be read from the host block.
    #[error("Configuration store {0} is not supported")]
    UnsupportedConfigStore(ConfigStore),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The host runtime failed to load a block or a user.
    #[error("Host runtime error: {0}")]
    Host(String),

    #[error("LTI 1.1 error: {0}")]
    Lti1p1(String),

    #[error("LTI 1.3 error: {0}")]
    Lti1p3(String),

    #[error("Key error: {0}")]
    Key(String),

    #[error("Signal delivery failed: {0}")]
    Signal(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rsa::Error> for LtiError {
    fn from(err: rsa::Error) -> Self {
        LtiError::Key(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for LtiError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        LtiError::Key(err.to_string())
    }
}
