use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use tracing::info;

use crate::compat::LtiBlock;
use crate::entity::lti_ags_line_item;
use crate::error::LtiError;

/// Fields of a line item to be created.
#[derive(Debug, Clone, Default)]
pub struct NewLineItem {
    pub lti_configuration_id: Option<i32>,
    pub resource_id: String,
    pub resource_link_id: String,
    pub label: String,
    pub score_maximum: i32,
    pub tag: String,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
}

impl fmt::Display for lti_ags_line_item::Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.resource_link_id, self.label)
    }
}

pub struct LineItemService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LineItemService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, item: NewLineItem) -> Result<lti_ags_line_item::Model, LtiError> {
        let model = lti_ags_line_item::ActiveModel {
            lti_configuration_id: Set(item.lti_configuration_id),
            resource_id: Set(item.resource_id),
            resource_link_id: Set(item.resource_link_id),
            label: Set(item.label),
            score_maximum: Set(item.score_maximum),
            tag: Set(item.tag),
            start_date_time: Set(item.start_date_time),
            end_date_time: Set(item.end_date_time),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(
            line_item_id = model.id,
            resource_link_id = %model.resource_link_id,
            "Created AGS line item"
        );
        Ok(model)
    }

    pub async fn find(&self, id: i32) -> Result<lti_ags_line_item::Model, LtiError> {
        lti_ags_line_item::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| LtiError::NotFound(format!("Line item {id}")))
    }

    /// Line items of a configuration, oldest first.
    pub async fn list_for_configuration(
        &self,
        lti_configuration_id: i32,
    ) -> Result<Vec<lti_ags_line_item::Model>, LtiError> {
        Ok(lti_ags_line_item::Entity::find()
            .filter(lti_ags_line_item::Column::LtiConfigurationId.eq(lti_configuration_id))
            .order_by_asc(lti_ags_line_item::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// The line item grading `block` under a configuration, created from the
    /// block's display name and weight when missing.
    pub async fn get_or_create_for_block(
        &self,
        lti_configuration_id: i32,
        block: &LtiBlock,
    ) -> Result<lti_ags_line_item::Model, LtiError> {
        if let Some(item) = self.find_for_block(lti_configuration_id, block).await? {
            return Ok(item);
        }

        let created = self
            .create(NewLineItem {
                lti_configuration_id: Some(lti_configuration_id),
                resource_link_id: block.location.clone(),
                label: block.display_name.clone(),
                score_maximum: block.weight.round() as i32,
                ..Default::default()
            })
            .await;

        match created {
            // Another launch created it first.
            Err(LtiError::Database(e))
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                self.find_for_block(lti_configuration_id, block)
                    .await?
                    .ok_or_else(|| {
                        LtiError::NotFound(format!("Line item for {}", block.location))
                    })
            }
            other => other,
        }
    }

    async fn find_for_block(
        &self,
        lti_configuration_id: i32,
        block: &LtiBlock,
    ) -> Result<Option<lti_ags_line_item::Model>, LtiError> {
        Ok(lti_ags_line_item::Entity::find()
            .filter(lti_ags_line_item::Column::LtiConfigurationId.eq(lti_configuration_id))
            .filter(lti_ags_line_item::Column::ResourceLinkId.eq(block.location.as_str()))
            .one(self.conn)
            .await?)
    }
}
