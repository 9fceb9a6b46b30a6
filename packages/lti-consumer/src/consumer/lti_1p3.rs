use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use url::Url;

use super::ags::LtiAgs;
use super::constants::{
    AGS_SCOPE_LINEITEM, AGS_SCOPE_LINEITEM_READONLY, AGS_SCOPE_RESULT_READONLY, AGS_SCOPE_SCORE,
    CLAIM_CONTEXT, CLAIM_CUSTOM, CLAIM_DEPLOYMENT_ID, CLAIM_LAUNCH_PRESENTATION,
    CLAIM_MESSAGE_TYPE, CLAIM_RESOURCE_LINK, CLAIM_ROLES, CLAIM_TARGET_LINK_URI, CLAIM_VERSION,
    CLIENT_ASSERTION_TYPE, LTI_1P3_MESSAGE_TYPE, LTI_1P3_VERSION, lti_1p3_roles,
};
use crate::error::LtiError;
use crate::utils::jwt::{PlatformKeyHandler, ToolKeyHandler};

/// Everything needed to build an LTI 1.3 consumer.
#[derive(Debug, Clone)]
pub struct Lti1p3Settings {
    pub iss: String,
    pub lti_oidc_url: String,
    pub lti_launch_url: String,
    pub client_id: String,
    pub deployment_id: String,
    pub rsa_key: String,
    pub rsa_key_id: String,
    /// Tool public key (PEM); optional until the tool is registered.
    pub tool_key: Option<String>,
    pub launch_lifetime_secs: i64,
    pub token_lifetime_secs: i64,
}

/// The parameters the tool sends back after OIDC login initiation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreflightResponse {
    pub client_id: String,
    pub redirect_uri: String,
    pub nonce: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub state: String,
    pub id_token: String,
}

/// Client credentials grant sent by the tool to obtain an AGS token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenRequest {
    pub grant_type: String,
    pub client_assertion_type: String,
    pub client_assertion: String,
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
}

/// LTI 1.3 platform side: OIDC login, signed launches and AGS.
pub struct LtiAdvantageConsumer {
    settings: Lti1p3Settings,
    key_handler: PlatformKeyHandler,
    tool_key_handler: Option<ToolKeyHandler>,

    user_claims: Option<Map<String, Value>>,
    resource_link_claim: Option<Value>,
    context_claim: Option<Value>,
    launch_presentation_claim: Option<Value>,
    custom_claim: Option<Value>,
    extra_claims: Map<String, Value>,

    ags: Option<LtiAgs>,
}

impl LtiAdvantageConsumer {
    pub fn new(settings: Lti1p3Settings) -> Result<Self, LtiError> {
        let key_handler = PlatformKeyHandler::new(&settings.rsa_key, &settings.rsa_key_id)?;
        let tool_key_handler = match settings.tool_key.as_deref() {
            Some(pem) if !pem.trim().is_empty() => Some(ToolKeyHandler::new(pem)?),
            _ => None,
        };

        Ok(Self {
            settings,
            key_handler,
            tool_key_handler,
            user_claims: None,
            resource_link_claim: None,
            context_claim: None,
            launch_presentation_claim: None,
            custom_claim: None,
            extra_claims: Map::new(),
            ags: None,
        })
    }

    pub fn settings(&self) -> &Lti1p3Settings {
        &self.settings
    }

    pub fn client_id(&self) -> &str {
        &self.settings.client_id
    }

    /// URL the browser is sent to for OIDC third party login initiation.
    pub fn prepare_preflight_url(
        &self,
        callback_url: &str,
        hint: &str,
        lti_hint: &str,
    ) -> Result<String, LtiError> {
        let url = Url::parse_with_params(
            &self.settings.lti_oidc_url,
            &[
                ("iss", self.settings.iss.as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("lti_deployment_id", self.settings.deployment_id.as_str()),
                ("target_link_uri", callback_url),
                ("login_hint", hint),
                ("lti_message_hint", lti_hint),
            ],
        )
        .map_err(|e| LtiError::Lti1p3(format!("Invalid OIDC url: {e}")))?;
        Ok(url.into())
    }

    /// Set `sub` and the role claim. `role` is an LMS role name.
    pub fn set_user_data(&mut self, user_id: &str, role: &str) -> Result<(), LtiError> {
        let roles = lti_1p3_roles(role)
            .ok_or_else(|| LtiError::Lti1p3(format!("Unknown role '{role}'")))?;

        let mut claims = Map::new();
        claims.insert("sub".into(), json!(user_id));
        claims.insert(CLAIM_ROLES.into(), json!(roles));
        self.user_claims = Some(claims);
        Ok(())
    }

    pub fn set_resource_link_claim(&mut self, resource_link_id: &str) {
        self.resource_link_claim = Some(json!({ "id": resource_link_id }));
    }

    pub fn set_context_claim(
        &mut self,
        context_id: &str,
        context_title: Option<&str>,
        context_label: Option<&str>,
    ) {
        let mut claim = Map::new();
        claim.insert("id".into(), json!(context_id));
        claim.insert(
            "type".into(),
            json!(["http://purl.imsglobal.org/vocab/lis/v2/course#CourseOffering"]),
        );
        if let Some(title) = context_title {
            claim.insert("title".into(), json!(title));
        }
        if let Some(label) = context_label {
            claim.insert("label".into(), json!(label));
        }
        self.context_claim = Some(Value::Object(claim));
    }

    pub fn set_launch_presentation_claim(
        &mut self,
        document_target: &str,
        return_url: Option<&str>,
    ) {
        let mut claim = Map::new();
        claim.insert("document_target".into(), json!(document_target));
        if let Some(url) = return_url {
            claim.insert("return_url".into(), json!(url));
        }
        self.launch_presentation_claim = Some(Value::Object(claim));
    }

    pub fn set_custom_parameters(&mut self, custom: HashMap<String, String>) {
        self.custom_claim = Some(json!(custom));
    }

    /// Add an arbitrary claim to every launch message.
    pub fn set_extra_claim(&mut self, claim: Map<String, Value>) {
        self.extra_claims.extend(claim);
    }

    /// Announce AGS to the tool. Line items are managed by the platform,
    /// so the tool only receives read access to them.
    pub fn enable_ags(&mut self, lineitems_url: String, lineitem_url: Option<String>) {
        let mut ags = LtiAgs::new(lineitems_url, lineitem_url);
        ags.allow_creating_lineitems = false;
        self.ags = Some(ags);
    }

    pub fn ags(&self) -> Option<&LtiAgs> {
        self.ags.as_ref()
    }

    /// Claims added on top of the core launch message.
    pub fn extra_claims(&self) -> Map<String, Value> {
        let mut claims = self.extra_claims.clone();
        if let Some(ags) = &self.ags {
            claims.extend(ags.get_lti_ags_launch_claim());
        }
        claims
    }

    /// The unsigned launch message.
    pub fn get_lti_launch_message(&self, include_extra_claims: bool) -> Map<String, Value> {
        let s = &self.settings;
        let mut message = Map::new();
        message.insert("iss".into(), json!(s.iss));
        message.insert("aud".into(), json!([s.client_id]));
        message.insert("azp".into(), json!(s.client_id));
        message.insert(CLAIM_MESSAGE_TYPE.into(), json!(LTI_1P3_MESSAGE_TYPE));
        message.insert(CLAIM_VERSION.into(), json!(LTI_1P3_VERSION));
        message.insert(CLAIM_DEPLOYMENT_ID.into(), json!(s.deployment_id));
        message.insert(CLAIM_TARGET_LINK_URI.into(), json!(s.lti_launch_url));

        if let Some(user) = &self.user_claims {
            message.extend(user.clone());
        }
        let optional = [
            (CLAIM_RESOURCE_LINK, &self.resource_link_claim),
            (CLAIM_CONTEXT, &self.context_claim),
            (CLAIM_LAUNCH_PRESENTATION, &self.launch_presentation_claim),
            (CLAIM_CUSTOM, &self.custom_claim),
        ];
        for (name, claim) in optional {
            if let Some(claim) = claim {
                message.insert(name.into(), claim.clone());
            }
        }

        if include_extra_claims {
            message.extend(self.extra_claims());
        }
        message
    }

    fn validate_preflight_response(&self, response: &PreflightResponse) -> Result<(), LtiError> {
        if response.nonce.is_empty() || response.state.is_empty() {
            return Err(LtiError::Lti1p3(
                "Preflight response is missing nonce or state".into(),
            ));
        }
        if response.redirect_uri != self.settings.lti_launch_url {
            return Err(LtiError::Lti1p3(format!(
                "Redirect uri '{}' does not match the launch url",
                response.redirect_uri
            )));
        }
        if response.client_id != self.settings.client_id {
            return Err(LtiError::Lti1p3("Client id does not match".into()));
        }
        Ok(())
    }

    /// Build the signed `id_token` answering a preflight response.
    pub fn generate_launch_request(
        &self,
        preflight_response: &PreflightResponse,
    ) -> Result<LaunchRequest, LtiError> {
        self.validate_preflight_response(preflight_response)?;
        if self.user_claims.is_none() {
            return Err(LtiError::Lti1p3("Required user data isn't set".into()));
        }
        if self.resource_link_claim.is_none() {
            return Err(LtiError::Lti1p3("Resource link claim isn't set".into()));
        }

        let mut message = self.get_lti_launch_message(true);
        message.insert("nonce".into(), json!(preflight_response.nonce));

        let id_token = self
            .key_handler
            .encode_and_sign(message, self.settings.launch_lifetime_secs)?;
        debug!(
            client_id = %self.settings.client_id,
            kid = self.key_handler.key_id(),
            "Signed LTI 1.3 launch"
        );

        Ok(LaunchRequest {
            state: preflight_response.state.clone(),
            id_token,
        })
    }

    /// Issue an AGS access token for a client credentials grant.
    pub fn access_token(
        &self,
        request: &AccessTokenRequest,
    ) -> Result<AccessTokenResponse, LtiError> {
        if request.grant_type != "client_credentials" {
            return Err(LtiError::Lti1p3(format!(
                "Unsupported grant type '{}'",
                request.grant_type
            )));
        }
        if request.client_assertion_type != CLIENT_ASSERTION_TYPE {
            return Err(LtiError::Lti1p3("Unsupported client assertion type".into()));
        }

        let tool_key = self
            .tool_key_handler
            .as_ref()
            .ok_or_else(|| LtiError::Lti1p3("Tool public key isn't set".into()))?;
        tool_key.validate_and_decode(&request.client_assertion).map_err(|e| {
            warn!(client_id = %self.settings.client_id, error = %e, "Rejected client assertion");
            e
        })?;

        let allowed = [
            AGS_SCOPE_LINEITEM,
            AGS_SCOPE_LINEITEM_READONLY,
            AGS_SCOPE_RESULT_READONLY,
            AGS_SCOPE_SCORE,
        ];
        let granted = request
            .scope
            .split_whitespace()
            .filter(|s| allowed.contains(s))
            .collect::<Vec<_>>()
            .join(" ");

        let mut message = Map::new();
        message.insert("sub".into(), json!(self.settings.client_id));
        message.insert("iss".into(), json!(self.settings.iss));
        message.insert("scopes".into(), json!(granted));
        let access_token = self
            .key_handler
            .encode_and_sign(message, self.settings.token_lifetime_secs)?;

        Ok(AccessTokenResponse {
            access_token,
            token_type: "bearer".into(),
            expires_in: self.settings.token_lifetime_secs,
            scope: granted,
        })
    }
}
