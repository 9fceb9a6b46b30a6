pub const LTI_1P1_MESSAGE_TYPE: &str = "basic-lti-launch-request";
pub const LTI_1P1_VERSION: &str = "LTI-1p0";

pub const LTI_1P3_VERSION: &str = "1.3.0";
pub const LTI_1P3_MESSAGE_TYPE: &str = "LtiResourceLinkRequest";

pub const CLAIM_MESSAGE_TYPE: &str = "https://purl.imsglobal.org/spec/lti/claim/message_type";
pub const CLAIM_VERSION: &str = "https://purl.imsglobal.org/spec/lti/claim/version";
pub const CLAIM_DEPLOYMENT_ID: &str = "https://purl.imsglobal.org/spec/lti/claim/deployment_id";
pub const CLAIM_TARGET_LINK_URI: &str =
    "https://purl.imsglobal.org/spec/lti/claim/target_link_uri";
pub const CLAIM_ROLES: &str = "https://purl.imsglobal.org/spec/lti/claim/roles";
pub const CLAIM_RESOURCE_LINK: &str = "https://purl.imsglobal.org/spec/lti/claim/resource_link";
pub const CLAIM_CONTEXT: &str = "https://purl.imsglobal.org/spec/lti/claim/context";
pub const CLAIM_LAUNCH_PRESENTATION: &str =
    "https://purl.imsglobal.org/spec/lti/claim/launch_presentation";
pub const CLAIM_CUSTOM: &str = "https://purl.imsglobal.org/spec/lti/claim/custom";

pub const AGS_CLAIM_ENDPOINT: &str = "https://purl.imsglobal.org/spec/lti-ags/claim/endpoint";
pub const AGS_SCOPE_LINEITEM: &str = "https://purl.imsglobal.org/spec/lti-ags/scope/lineitem";
pub const AGS_SCOPE_LINEITEM_READONLY: &str =
    "https://purl.imsglobal.org/spec/lti-ags/scope/lineitem.readonly";
pub const AGS_SCOPE_RESULT_READONLY: &str =
    "https://purl.imsglobal.org/spec/lti-ags/scope/result.readonly";
pub const AGS_SCOPE_SCORE: &str = "https://purl.imsglobal.org/spec/lti-ags/scope/score";

pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

const ROLE_ADMINISTRATOR: &str = "http://purl.imsglobal.org/vocab/lis/v2/system/person#Administrator";
const ROLE_INSTRUCTOR: &str = "http://purl.imsglobal.org/vocab/lis/v2/institution/person#Instructor";
const ROLE_STUDENT: &str = "http://purl.imsglobal.org/vocab/lis/v2/institution/person#Student";

/// Map an LMS role name to LTI 1.3 role URIs.
pub fn lti_1p3_roles(role: &str) -> Option<&'static [&'static str]> {
    match role {
        "staff" => Some(&[ROLE_ADMINISTRATOR, ROLE_INSTRUCTOR]),
        "instructor" => Some(&[ROLE_INSTRUCTOR]),
        "student" | "guest" => Some(&[ROLE_STUDENT]),
        _ => None,
    }
}
