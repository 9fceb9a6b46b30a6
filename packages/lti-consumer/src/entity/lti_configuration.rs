use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// LTI protocol version used by a configuration.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum LtiVersion {
    #[sea_orm(string_value = "lti_1p1")]
    Lti1p1,
    #[sea_orm(string_value = "lti_1p3")]
    Lti1p3,
}

impl LtiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lti1p1 => "lti_1p1",
            Self::Lti1p3 => "lti_1p3",
        }
    }
}

impl fmt::Display for LtiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for LtiVersion {
    fn default() -> Self {
        Self::Lti1p1
    }
}

/// Where the launch settings of a configuration are read from.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigStore {
    /// Settings live on the host block.
    #[sea_orm(string_value = "CONFIG_ON_XBLOCK")]
    ConfigOnXblock,
    /// Settings live on this row.
    #[sea_orm(string_value = "CONFIG_ON_DB")]
    ConfigOnDb,
}

impl ConfigStore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigOnXblock => "CONFIG_ON_XBLOCK",
            Self::ConfigOnDb => "CONFIG_ON_DB",
        }
    }
}

impl fmt::Display for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::ConfigOnXblock
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lti_configuration")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub version: LtiVersion,
    pub config_store: ConfigStore,

    /// Usage key of the block this configuration belongs to.
    #[sea_orm(indexed)]
    pub location: Option<String>,

    /// PEM encoded PKCS#1 private key. Empty until first use.
    #[sea_orm(column_type = "Text")]
    pub lti_1p3_internal_private_key: String,
    pub lti_1p3_internal_private_key_id: String,
    /// JSON encoded public JWK derived from the private key.
    #[sea_orm(column_type = "Text")]
    pub lti_1p3_internal_public_jwk: String,

    #[sea_orm(unique)]
    pub lti_1p3_client_id: String,

    #[sea_orm(has_many)]
    pub line_items: HasMany<super::lti_ags_line_item::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
