use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::event::Event;
use common::signal::{Receiver, SignalRegistry};
use common::{ActivityProgress, GradingProgress};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::compat::{GradePublication, HostRuntime};
use crate::entity::{lti_ags_line_item, lti_ags_score};

pub const SCORE_SAVED: &str = "score_saved";

/// Emitted after an AGS score is inserted or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSaved {
    pub score_id: i32,
    pub created: bool,
    pub line_item_id: i32,
    /// Location of the block graded by the line item.
    pub resource_link_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub score_given: Option<f64>,
    pub score_maximum: Option<f64>,
    pub comment: Option<String>,
    pub activity_progress: ActivityProgress,
    pub grading_progress: GradingProgress,
}

impl ScoreSaved {
    pub fn new(
        score: &lti_ags_score::Model,
        line_item: &lti_ags_line_item::Model,
        created: bool,
    ) -> Self {
        Self {
            score_id: score.id,
            created,
            line_item_id: line_item.id,
            resource_link_id: line_item.resource_link_id.clone(),
            user_id: score.user_id.clone(),
            timestamp: score.timestamp,
            score_given: score.score_given,
            score_maximum: score.score_maximum,
            comment: score.comment.clone(),
            activity_progress: score.activity_progress,
            grading_progress: score.grading_progress,
        }
    }
}

impl Event for ScoreSaved {
    fn topic(&self) -> &str {
        SCORE_SAVED
    }
}

/// Push fully graded scores into the host gradebook.
pub struct PublishGradeOnScoreUpdate {
    host: Arc<dyn HostRuntime>,
}

impl PublishGradeOnScoreUpdate {
    pub const ID: &'static str = "publish_grade_on_score_update";

    pub fn new(host: Arc<dyn HostRuntime>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl Receiver<ScoreSaved> for PublishGradeOnScoreUpdate {
    fn id(&self) -> &str {
        Self::ID
    }

    fn topics(&self) -> &[&str] {
        &[SCORE_SAVED]
    }

    async fn on_signal(&self, e: &ScoreSaved) -> anyhow::Result<()> {
        if !e.grading_progress.is_final() {
            return Ok(());
        }

        let block = self
            .host
            .load_block_as_anonymous_user(&e.resource_link_id)
            .await?;

        if block.is_past_due() && !block.accept_grades_past_due {
            warn!(
                score_id = e.score_id,
                location = %block.location,
                "Score received after the deadline, not publishing"
            );
            return Ok(());
        }

        let user = self.host.get_user_from_external_user_id(&e.user_id).await?;
        let value = block.weighted_grade(e.score_given, e.score_maximum);

        self.host
            .publish_grade(GradePublication {
                location: block.location.clone(),
                user,
                value,
                max_value: block.weight,
                comment: e.comment.clone(),
                only_if_higher: false,
            })
            .await?;

        info!(
            score_id = e.score_id,
            location = %block.location,
            value,
            "Published grade from LTI score"
        );
        Ok(())
    }
}

/// Registry with the receivers every consumer installation needs.
pub fn default_registry(host: Arc<dyn HostRuntime>) -> SignalRegistry {
    let mut registry = SignalRegistry::new();
    registry.connect::<ScoreSaved, _>(PublishGradeOnScoreUpdate::new(host));
    registry
}
