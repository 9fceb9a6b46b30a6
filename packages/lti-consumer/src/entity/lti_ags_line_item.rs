use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// AGS line item: the tool-facing view of a gradable activity.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lti_ags_line_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// NULL for line items created outside of a launch.
    #[sea_orm(unique_key = "configuration_link")]
    pub lti_configuration_id: Option<i32>,
    #[sea_orm(belongs_to, from = "lti_configuration_id", to = "id")]
    pub lti_configuration: HasOne<super::lti_configuration::Entity>,

    /// Tool-side identifier, may be empty.
    pub resource_id: String,
    /// Usage key of the block this line item grades.
    #[sea_orm(indexed, unique_key = "configuration_link")]
    pub resource_link_id: String,

    pub label: String,
    pub score_maximum: i32,
    pub tag: String,

    pub start_date_time: Option<DateTimeUtc>,
    pub end_date_time: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::lti_ags_score::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
