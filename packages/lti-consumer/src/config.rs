use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Settings of the hosting LMS.
#[derive(Debug, Deserialize, Clone)]
pub struct LmsConfig {
    /// Public root URL of the LMS, used as LTI 1.3 issuer and for AGS endpoints.
    /// Default: "https://example.com".
    #[serde(default = "default_lms_base_url")]
    pub base_url: String,
}

fn default_lms_base_url() -> String {
    "https://example.com".into()
}

impl Default for LmsConfig {
    fn default() -> Self {
        Self {
            base_url: default_lms_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Default: "sqlite::memory:".
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds before an idle pooled connection is closed. Unset keeps them open.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
}

fn default_database_url() -> String {
    "sqlite::memory:".into()
}
fn default_max_connections() -> u32 {
    1
}
fn default_min_connections() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            idle_timeout_secs: None,
        }
    }
}

/// Platform key generation.
#[derive(Debug, Deserialize, Clone)]
pub struct KeyConfig {
    /// RSA modulus size for generated platform keys. Default: 2048.
    #[serde(default = "default_rsa_bits")]
    pub rsa_bits: usize,
}

fn default_rsa_bits() -> usize {
    2048
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            rsa_bits: default_rsa_bits(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Lti1p3Config {
    /// Deployment id announced to tools. Default: "1".
    #[serde(default = "default_deployment_id")]
    pub deployment_id: String,
    /// Lifetime of signed launch messages, in seconds. Default: 300.
    #[serde(default = "default_launch_lifetime_secs")]
    pub launch_lifetime_secs: i64,
    /// Lifetime of AGS access tokens, in seconds. Default: 3600.
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: i64,
}

fn default_deployment_id() -> String {
    "1".into()
}
fn default_launch_lifetime_secs() -> i64 {
    300
}
fn default_token_lifetime_secs() -> i64 {
    3600
}

impl Default for Lti1p3Config {
    fn default() -> Self {
        Self {
            deployment_id: default_deployment_id(),
            launch_lifetime_secs: default_launch_lifetime_secs(),
            token_lifetime_secs: default_token_lifetime_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub lms: LmsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub keys: KeyConfig,
    #[serde(default)]
    pub lti_1p3: Lti1p3Config,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("LTI_CONSUMER_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("lms.base_url", default_lms_base_url())?
            .set_default("database.url", default_database_url())?
            .set_default("keys.rsa_bits", 2048_i64)?
            .set_default("lti_1p3.deployment_id", default_deployment_id())?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., LTI_CONSUMER__LMS__BASE_URL)
            .add_source(Environment::with_prefix("LTI_CONSUMER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
