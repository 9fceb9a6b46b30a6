use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use super::constants::{LTI_1P1_MESSAGE_TYPE, LTI_1P1_VERSION};
use super::oauth;
use crate::error::LtiError;

/// User fields sent with an LTI 1.1 launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lti1p1UserData {
    pub user_id: String,
    /// Comma separated LIS roles.
    pub roles: String,
    pub result_sourcedid: String,
    pub person_sourcedid: Option<String>,
    pub person_contact_email_primary: Option<String>,
    pub person_name_full: Option<String>,
}

/// Builds OAuth-signed LTI 1.1 basic launch requests.
#[derive(Debug, Clone)]
pub struct LtiConsumer1p1 {
    launch_url: String,
    oauth_key: String,
    oauth_secret: String,
    user_data: Option<Lti1p1UserData>,
    context: BTreeMap<String, String>,
    outcome_service_url: Option<String>,
    launch_presentation_locale: Option<String>,
    custom_parameters: BTreeMap<String, String>,
}

impl LtiConsumer1p1 {
    pub fn new(
        launch_url: impl Into<String>,
        oauth_key: impl Into<String>,
        oauth_secret: impl Into<String>,
    ) -> Self {
        Self {
            launch_url: launch_url.into(),
            oauth_key: oauth_key.into(),
            oauth_secret: oauth_secret.into(),
            user_data: None,
            context: BTreeMap::new(),
            outcome_service_url: None,
            launch_presentation_locale: None,
            custom_parameters: BTreeMap::new(),
        }
    }

    pub fn launch_url(&self) -> &str {
        &self.launch_url
    }

    pub fn oauth_key(&self) -> &str {
        &self.oauth_key
    }

    pub fn set_user_data(&mut self, user_data: Lti1p1UserData) {
        self.user_data = Some(user_data);
    }

    pub fn set_context_data(&mut self, context_id: &str, context_title: &str, context_label: &str) {
        self.context = BTreeMap::from([
            ("context_id".to_string(), context_id.to_string()),
            ("context_title".to_string(), context_title.to_string()),
            ("context_label".to_string(), context_label.to_string()),
        ]);
    }

    pub fn set_outcome_service_url(&mut self, url: impl Into<String>) {
        self.outcome_service_url = Some(url.into());
    }

    pub fn set_launch_presentation_locale(&mut self, locale: impl Into<String>) {
        self.launch_presentation_locale = Some(locale.into());
    }

    /// Custom parameter names must carry the `custom_` prefix.
    pub fn set_custom_parameters(
        &mut self,
        parameters: BTreeMap<String, String>,
    ) -> Result<(), LtiError> {
        if let Some(bad) = parameters.keys().find(|k| !k.starts_with("custom_")) {
            return Err(LtiError::Lti1p1(format!(
                "Custom parameter '{bad}' must start with 'custom_'"
            )));
        }
        self.custom_parameters = parameters;
        Ok(())
    }

    /// Unsigned launch parameters for a resource link.
    pub fn launch_parameters(
        &self,
        resource_link_id: &str,
    ) -> Result<BTreeMap<String, String>, LtiError> {
        let user = self
            .user_data
            .as_ref()
            .ok_or_else(|| LtiError::Lti1p1("Required user data isn't set".into()))?;

        let mut params = BTreeMap::from([
            ("oauth_callback".to_string(), "about:blank".to_string()),
            ("launch_presentation_return_url".to_string(), String::new()),
            ("lti_message_type".to_string(), LTI_1P1_MESSAGE_TYPE.to_string()),
            ("lti_version".to_string(), LTI_1P1_VERSION.to_string()),
            ("resource_link_id".to_string(), resource_link_id.to_string()),
            ("user_id".to_string(), user.user_id.clone()),
            ("roles".to_string(), user.roles.clone()),
            ("lis_result_sourcedid".to_string(), user.result_sourcedid.clone()),
        ]);

        let optional = [
            ("lis_person_sourcedid", &user.person_sourcedid),
            (
                "lis_person_contact_email_primary",
                &user.person_contact_email_primary,
            ),
            ("lis_person_name_full", &user.person_name_full),
            ("lis_outcome_service_url", &self.outcome_service_url),
            ("launch_presentation_locale", &self.launch_presentation_locale),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                params.insert(name.to_string(), value.clone());
            }
        }

        params.extend(self.context.clone());
        params.extend(self.custom_parameters.clone());
        Ok(params)
    }

    /// Launch parameters signed with OAuth 1.0a, ready to POST as a form.
    pub fn generate_launch_request(
        &self,
        resource_link_id: &str,
    ) -> Result<BTreeMap<String, String>, LtiError> {
        let mut params = self.launch_parameters(resource_link_id)?;
        oauth::sign_parameters(
            &self.launch_url,
            &mut params,
            &self.oauth_key,
            &self.oauth_secret,
            &oauth::generate_nonce(),
            Utc::now().timestamp(),
        )?;
        debug!(resource_link_id, launch_url = %self.launch_url, "Signed LTI 1.1 launch");
        Ok(params)
    }

    /// Check a signed request coming back from the tool (e.g. outcomes).
    pub fn verify_request(&self, url: &str, params: &BTreeMap<String, String>) -> bool {
        params.get("oauth_consumer_key").map(String::as_str) == Some(self.oauth_key.as_str())
            && oauth::verify(url, params, &self.oauth_secret).unwrap_or(false)
    }
}
