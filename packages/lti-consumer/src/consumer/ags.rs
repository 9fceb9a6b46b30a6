use serde_json::{Map, Value, json};

use super::constants::{
    AGS_CLAIM_ENDPOINT, AGS_SCOPE_LINEITEM, AGS_SCOPE_LINEITEM_READONLY,
    AGS_SCOPE_RESULT_READONLY, AGS_SCOPE_SCORE,
};

/// Assignment and Grade Services settings announced to the tool on launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LtiAgs {
    pub lineitems_url: String,
    pub lineitem_url: Option<String>,
    pub allow_creating_lineitems: bool,
    pub results_service_enabled: bool,
    pub scores_service_enabled: bool,
}

impl LtiAgs {
    pub fn new(lineitems_url: impl Into<String>, lineitem_url: Option<String>) -> Self {
        Self {
            lineitems_url: lineitems_url.into(),
            lineitem_url,
            allow_creating_lineitems: true,
            results_service_enabled: true,
            scores_service_enabled: true,
        }
    }

    pub fn get_available_scopes(&self) -> Vec<&'static str> {
        let mut scopes = Vec::with_capacity(3);
        if self.allow_creating_lineitems {
            scopes.push(AGS_SCOPE_LINEITEM);
        } else {
            scopes.push(AGS_SCOPE_LINEITEM_READONLY);
        }
        if self.results_service_enabled {
            scopes.push(AGS_SCOPE_RESULT_READONLY);
        }
        if self.scores_service_enabled {
            scopes.push(AGS_SCOPE_SCORE);
        }
        scopes
    }

    /// The AGS endpoint claim, keyed by its claim URI.
    pub fn get_lti_ags_launch_claim(&self) -> Map<String, Value> {
        let mut endpoint = Map::new();
        endpoint.insert("scope".into(), json!(self.get_available_scopes()));
        endpoint.insert("lineitems".into(), json!(self.lineitems_url));
        if let Some(lineitem) = &self.lineitem_url {
            endpoint.insert("lineitem".into(), json!(lineitem));
        }

        let mut claim = Map::new();
        claim.insert(AGS_CLAIM_ENDPOINT.into(), Value::Object(endpoint));
        claim
    }
}
