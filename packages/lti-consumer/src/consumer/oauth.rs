//! OAuth 1.0a HMAC-SHA1 body signing used by LTI 1.1 launches.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha1::Sha1;

use crate::error::LtiError;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding, as OAuth requires.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the signature base string for a POST with form parameters.
pub fn signature_base_string(url: &str, params: &BTreeMap<String, String>) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "oauth_signature")
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("POST&{}&{}", encode(url), encode(&normalized))
}

/// Compute the base64 HMAC-SHA1 signature of `params` for `url`.
pub fn sign(
    url: &str,
    params: &BTreeMap<String, String>,
    consumer_secret: &str,
) -> Result<String, LtiError> {
    let mac = signature_mac(url, params, consumer_secret)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn signature_mac(
    url: &str,
    params: &BTreeMap<String, String>,
    consumer_secret: &str,
) -> Result<HmacSha1, LtiError> {
    let key = format!("{}&", encode(consumer_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| LtiError::Lti1p1(format!("Invalid OAuth secret: {e}")))?;
    mac.update(signature_base_string(url, params).as_bytes());
    Ok(mac)
}

/// Add the OAuth protocol parameters and the signature to `params`.
pub fn sign_parameters(
    url: &str,
    params: &mut BTreeMap<String, String>,
    consumer_key: &str,
    consumer_secret: &str,
    nonce: &str,
    timestamp: i64,
) -> Result<(), LtiError> {
    params.insert("oauth_consumer_key".into(), consumer_key.into());
    params.insert("oauth_nonce".into(), nonce.into());
    params.insert("oauth_signature_method".into(), SIGNATURE_METHOD.into());
    params.insert("oauth_timestamp".into(), timestamp.to_string());
    params.insert("oauth_version".into(), OAUTH_VERSION.into());
    let signature = sign(url, params, consumer_secret)?;
    params.insert("oauth_signature".into(), signature);
    Ok(())
}

/// Check the `oauth_signature` carried by `params`. The comparison runs in
/// constant time.
pub fn verify(
    url: &str,
    params: &BTreeMap<String, String>,
    consumer_secret: &str,
) -> Result<bool, LtiError> {
    let Some(provided) = params.get("oauth_signature") else {
        return Ok(false);
    };
    let Ok(provided) = STANDARD.decode(provided) else {
        return Ok(false);
    };
    let mac = signature_mac(url, params, consumer_secret)?;
    Ok(mac.verify_slice(&provided).is_ok())
}

pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
