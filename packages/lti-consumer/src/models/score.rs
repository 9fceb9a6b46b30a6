use std::fmt;

use chrono::{DateTime, Utc};
use common::signal::SignalRegistry;
use common::{ActivityProgress, GradingProgress};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{error, info};

use crate::entity::{lti_ags_line_item, lti_ags_score};
use crate::error::LtiError;
use crate::signals::ScoreSaved;

/// A score as submitted by the tool for one user.
#[derive(Debug, Clone)]
pub struct NewScore {
    pub line_item_id: i32,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub score_given: Option<f64>,
    pub score_maximum: Option<f64>,
    pub comment: Option<String>,
    pub activity_progress: ActivityProgress,
    pub grading_progress: GradingProgress,
}

/// `10.0`, `0.5`, `1e+16`, `1.5e-05` or `None`.
fn fmt_score(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "None".into();
    };
    let text = format!("{v:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

impl fmt::Display for lti_ags_score::Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineItem {}: score {} out of {} - {}",
            self.line_item_id,
            fmt_score(self.score_given),
            fmt_score(self.score_maximum),
            self.grading_progress
        )
    }
}

pub struct ScoreService<'a, C: ConnectionTrait> {
    conn: &'a C,
    signals: &'a SignalRegistry,
}

impl<'a, C: ConnectionTrait> ScoreService<'a, C> {
    pub fn new(conn: &'a C, signals: &'a SignalRegistry) -> Self {
        Self { conn, signals }
    }

    /// Insert or update the score of `(line_item_id, user_id)` and emit
    /// [`ScoreSaved`].
    ///
    /// The score is committed before receivers run, so it stays stored when
    /// this returns [`LtiError::Signal`].
    pub async fn save(&self, score: NewScore) -> Result<lti_ags_score::Model, LtiError> {
        let line_item = lti_ags_line_item::Entity::find_by_id(score.line_item_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| LtiError::NotFound(format!("Line item {}", score.line_item_id)))?;

        let existing = self.find_for_user(score.line_item_id, &score.user_id).await?;
        let created = existing.is_none();

        let mut active: lti_ags_score::ActiveModel = match existing {
            Some(model) => model.into(),
            None => lti_ags_score::ActiveModel {
                line_item_id: Set(score.line_item_id),
                user_id: Set(score.user_id.clone()),
                ..Default::default()
            },
        };
        active.timestamp = Set(score.timestamp);
        active.score_given = Set(score.score_given);
        active.score_maximum = Set(score.score_maximum);
        active.comment = Set(score.comment);
        active.activity_progress = Set(score.activity_progress);
        active.grading_progress = Set(score.grading_progress);

        let model = if created {
            active.insert(self.conn).await?
        } else {
            active.update(self.conn).await?
        };

        info!(
            score_id = model.id,
            line_item_id = model.line_item_id,
            created,
            grading_progress = %model.grading_progress,
            "Saved AGS score"
        );

        let event = ScoreSaved::new(&model, &line_item, created);
        self.signals.send(&event).await.map_err(|e| {
            error!(score_id = model.id, error = %e, "Score signal failed");
            LtiError::Signal(e.to_string())
        })?;

        Ok(model)
    }

    pub async fn find_for_user(
        &self,
        line_item_id: i32,
        user_id: &str,
    ) -> Result<Option<lti_ags_score::Model>, LtiError> {
        Ok(lti_ags_score::Entity::find()
            .filter(lti_ags_score::Column::LineItemId.eq(line_item_id))
            .filter(lti_ags_score::Column::UserId.eq(user_id))
            .one(self.conn)
            .await?)
    }

    pub async fn list_for_line_item(
        &self,
        line_item_id: i32,
    ) -> Result<Vec<lti_ags_score::Model>, LtiError> {
        Ok(lti_ags_score::Entity::find()
            .filter(lti_ags_score::Column::LineItemId.eq(line_item_id))
            .all(self.conn)
            .await?)
    }
}
