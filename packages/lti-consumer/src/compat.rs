//! Seam between the consumer models and the hosting LMS runtime.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::lti_configuration::LtiVersion;
use crate::error::LtiError;

/// Snapshot of the host's LTI block, as seen by an anonymous viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct LtiBlock {
    /// Usage key of the block in the content tree.
    pub location: String,
    pub display_name: String,
    pub lti_version: LtiVersion,

    pub launch_url: String,
    pub lti_provider_key: String,
    pub lti_provider_secret: String,

    pub lti_1p3_launch_url: String,
    pub lti_1p3_oidc_url: String,
    /// PEM encoded public key of the tool.
    pub lti_1p3_tool_public_key: String,

    pub has_score: bool,
    /// Points the block is worth in the course gradebook.
    pub weight: f64,
    pub due: Option<DateTime<Utc>>,
    pub graceperiod: Option<Duration>,
    pub accept_grades_past_due: bool,
}

impl LtiBlock {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            display_name: "LTI Consumer".into(),
            lti_version: LtiVersion::Lti1p1,
            launch_url: String::new(),
            lti_provider_key: String::new(),
            lti_provider_secret: String::new(),
            lti_1p3_launch_url: String::new(),
            lti_1p3_oidc_url: String::new(),
            lti_1p3_tool_public_key: String::new(),
            has_score: false,
            weight: 1.0,
            due: None,
            graceperiod: None,
            accept_grades_past_due: true,
        }
    }

    /// OAuth 1.0a consumer key and secret for LTI 1.1 launches.
    pub fn lti_provider_key_secret(&self) -> (&str, &str) {
        (&self.lti_provider_key, &self.lti_provider_secret)
    }

    /// The deadline including the grace period, if any.
    pub fn close_date(&self) -> Option<DateTime<Utc>> {
        self.due
            .map(|due| due + self.graceperiod.unwrap_or_else(Duration::zero))
    }

    pub fn is_past_due_at(&self, now: DateTime<Utc>) -> bool {
        self.close_date().is_some_and(|close| now > close)
    }

    pub fn is_past_due(&self) -> bool {
        self.is_past_due_at(Utc::now())
    }

    /// Turn a tool score into the value written to the gradebook.
    ///
    /// The score is clamped into `[0, score_maximum]`, scaled to `[0, 1]`
    /// and multiplied by the block weight.
    pub fn weighted_grade(&self, score_given: Option<f64>, score_maximum: Option<f64>) -> f64 {
        let maximum = match score_maximum {
            Some(m) if m > 0.0 => m,
            _ => return 0.0,
        };
        let given = score_given.unwrap_or(0.0).clamp(0.0, maximum);
        given / maximum * self.weight
    }
}

/// A host user resolved from an external (anonymous) user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: i64,
    pub username: String,
}

/// Grade event handed to the host gradebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradePublication {
    pub location: String,
    pub user: HostUser,
    pub value: f64,
    pub max_value: f64,
    pub comment: Option<String>,
    pub only_if_higher: bool,
}

/// Services the hosting LMS provides to the consumer.
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Load a block without a user context.
    async fn load_block_as_anonymous_user(&self, location: &str) -> Result<LtiBlock, LtiError>;

    async fn get_user_from_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<HostUser, LtiError>;

    async fn publish_grade(&self, grade: GradePublication) -> Result<(), LtiError>;
}
