/// Root of the consumer's REST API, relative to the LMS base URL.
const API_ROOT: &str = "/api/lti_consumer/v1";

/// AGS line item container for a configuration, or one line item inside it.
pub fn lti_ags_lineitems_url(
    lms_base: &str,
    lti_config_id: i32,
    lineitem_id: Option<i32>,
) -> String {
    let base = format!(
        "{}{API_ROOT}/lti/{lti_config_id}/lti-ags",
        lms_base.trim_end_matches('/')
    );
    match lineitem_id {
        Some(id) => format!("{base}/{id}"),
        None => base,
    }
}

/// Public JWKS endpoint of a configuration.
pub fn public_keyset_url(lms_base: &str, lti_config_id: i32) -> String {
    format!(
        "{}{API_ROOT}/public_keysets/{lti_config_id}",
        lms_base.trim_end_matches('/')
    )
}
