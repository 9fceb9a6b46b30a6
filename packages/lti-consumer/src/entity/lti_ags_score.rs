use common::{ActivityProgress, GradingProgress};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A score submitted by the tool for one user on one line item.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lti_ags_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "line_item_user")]
    pub line_item_id: i32,
    #[sea_orm(belongs_to, from = "line_item_id", to = "id")]
    pub line_item: HasOne<super::lti_ags_line_item::Entity>,

    pub timestamp: DateTimeUtc,
    pub score_given: Option<f64>,
    pub score_maximum: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,

    pub activity_progress: ActivityProgress,
    pub grading_progress: GradingProgress,

    /// External (anonymous) user id as sent by the tool.
    #[sea_orm(unique_key = "line_item_user")]
    pub user_id: String,
}

impl ActiveModelBehavior for ActiveModel {}
