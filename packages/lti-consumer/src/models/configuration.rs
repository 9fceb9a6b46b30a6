use std::fmt;

use sea_orm::ActiveValue::Unchanged;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde_json::Value;
use tracing::{debug, info};

use crate::compat::{HostRuntime, LtiBlock};
use crate::config::KeyConfig;
use crate::consumer::lti_1p3::Lti1p3Settings;
use crate::consumer::{LtiAdvantageConsumer, LtiConsumer, LtiConsumer1p1};
use crate::entity::lti_configuration::{self, ConfigStore, LtiVersion};
use crate::error::LtiError;
use crate::keys::{generate_platform_keys, keyset, public_jwk_from_private_pem};
use crate::models::line_item::LineItemService;
use crate::state::AppState;
use crate::utils::endpoints::lti_ags_lineitems_url;

/// Fields of a configuration to be created.
#[derive(Debug, Clone, Default)]
pub struct NewLtiConfiguration {
    pub version: LtiVersion,
    pub config_store: ConfigStore,
    pub location: Option<String>,
}

impl fmt::Display for lti_configuration::Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {}",
            self.config_store,
            self.version,
            self.location.as_deref().unwrap_or("None")
        )
    }
}

/// A stored LTI configuration together with its lazily resolved host block.
#[derive(Debug, Clone)]
pub struct LtiConfiguration {
    model: lti_configuration::Model,
    block: Option<LtiBlock>,
}

impl LtiConfiguration {
    pub fn from_model(model: lti_configuration::Model) -> Self {
        Self { model, block: None }
    }

    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        new: NewLtiConfiguration,
    ) -> Result<Self, LtiError> {
        let model = lti_configuration::ActiveModel {
            version: Set(new.version),
            config_store: Set(new.config_store),
            location: Set(new.location),
            lti_1p3_internal_private_key: Set(String::new()),
            lti_1p3_internal_private_key_id: Set(String::new()),
            lti_1p3_internal_public_jwk: Set(String::new()),
            lti_1p3_client_id: Set(uuid::Uuid::new_v4().to_string()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(
            lti_config_id = model.id,
            version = %model.version,
            "Created LTI configuration"
        );
        Ok(Self::from_model(model))
    }

    pub async fn find<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Self, LtiError> {
        lti_configuration::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Self::from_model)
            .ok_or_else(|| LtiError::NotFound(format!("LTI configuration {id}")))
    }

    pub fn model(&self) -> &lti_configuration::Model {
        &self.model
    }

    pub fn id(&self) -> i32 {
        self.model.id
    }

    pub fn version(&self) -> LtiVersion {
        self.model.version
    }

    pub fn location(&self) -> Option<&str> {
        self.model.location.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.model.lti_1p3_client_id
    }

    /// Point the configuration at another block. Drops the cached block.
    pub async fn set_location<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        location: Option<String>,
    ) -> Result<(), LtiError> {
        self.model.location = location;
        self.block = None;
        self.save(conn).await
    }

    /// The host block of this configuration, loaded on first use.
    pub async fn block(&mut self, host: &dyn HostRuntime) -> Result<&LtiBlock, LtiError> {
        if self.block.is_none() {
            let location = self
                .model
                .location
                .as_deref()
                .filter(|l| !l.is_empty())
                .ok_or(LtiError::MissingLocation)?;
            let block = host.load_block_as_anonymous_user(location).await?;
            debug!(lti_config_id = self.model.id, location, "Resolved LTI block");
            self.block = Some(block);
        }
        self.block.as_ref().ok_or(LtiError::MissingLocation)
    }

    /// Use `block` instead of loading it through the host.
    pub fn set_block(&mut self, block: LtiBlock) {
        self.block = Some(block);
    }

    pub fn internal_private_key(&self) -> &str {
        &self.model.lti_1p3_internal_private_key
    }

    pub fn internal_private_key_id(&self) -> &str {
        &self.model.lti_1p3_internal_private_key_id
    }

    pub fn internal_public_jwk(&self) -> &str {
        &self.model.lti_1p3_internal_public_jwk
    }

    /// Overwrite the stored public JWK text. An empty value makes the next
    /// key access derive it again from the private key.
    pub async fn set_internal_public_jwk<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        jwk: impl Into<String>,
    ) -> Result<(), LtiError> {
        self.model.lti_1p3_internal_public_jwk = jwk.into();
        self.save(conn).await
    }

    async fn ensure_lti_1p3_keys<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        keys: &KeyConfig,
    ) -> Result<(), LtiError> {
        if self.model.lti_1p3_internal_private_key.is_empty() {
            let generated = generate_platform_keys(keys.rsa_bits)?;
            self.model.lti_1p3_internal_private_key = generated.private_key_pem;
            self.model.lti_1p3_internal_private_key_id = generated.key_id;
            self.model.lti_1p3_internal_public_jwk = generated.public_jwk;
            self.save(conn).await?;
        } else if self.model.lti_1p3_internal_public_jwk.is_empty() {
            self.model.lti_1p3_internal_public_jwk = public_jwk_from_private_pem(
                &self.model.lti_1p3_internal_private_key,
                &self.model.lti_1p3_internal_private_key_id,
            )?;
            self.save(conn).await?;
            debug!(lti_config_id = self.model.id, "Regenerated public JWK");
        }
        Ok(())
    }

    /// Public JWK of the platform key, generating the key pair if needed.
    pub async fn public_jwk<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        keys: &KeyConfig,
    ) -> Result<Value, LtiError> {
        self.ensure_lti_1p3_keys(conn, keys).await?;
        Ok(serde_json::from_str(&self.model.lti_1p3_internal_public_jwk)?)
    }

    pub async fn private_key<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        keys: &KeyConfig,
    ) -> Result<String, LtiError> {
        self.ensure_lti_1p3_keys(conn, keys).await?;
        Ok(self.model.lti_1p3_internal_private_key.clone())
    }

    pub async fn private_key_id<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        keys: &KeyConfig,
    ) -> Result<String, LtiError> {
        self.ensure_lti_1p3_keys(conn, keys).await?;
        Ok(self.model.lti_1p3_internal_private_key_id.clone())
    }

    /// JWKS document holding the platform public key.
    pub async fn get_public_keyset<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        keys: &KeyConfig,
    ) -> Result<Value, LtiError> {
        Ok(keyset(self.public_jwk(conn, keys).await?))
    }

    pub async fn save<C: ConnectionTrait>(&mut self, conn: &C) -> Result<(), LtiError> {
        let active = lti_configuration::ActiveModel {
            id: Unchanged(self.model.id),
            version: Set(self.model.version),
            config_store: Set(self.model.config_store),
            location: Set(self.model.location.clone()),
            lti_1p3_internal_private_key: Set(self.model.lti_1p3_internal_private_key.clone()),
            lti_1p3_internal_private_key_id: Set(self
                .model
                .lti_1p3_internal_private_key_id
                .clone()),
            lti_1p3_internal_public_jwk: Set(self.model.lti_1p3_internal_public_jwk.clone()),
            lti_1p3_client_id: Set(self.model.lti_1p3_client_id.clone()),
            ..Default::default()
        };
        self.model = active.update(conn).await?;
        Ok(())
    }

    /// Reload the stored fields. The cached block is kept.
    pub async fn refresh_from_db<C: ConnectionTrait>(&mut self, conn: &C) -> Result<(), LtiError> {
        self.model = lti_configuration::Entity::find_by_id(self.model.id)
            .one(conn)
            .await?
            .ok_or_else(|| LtiError::NotFound(format!("LTI configuration {}", self.model.id)))?;
        Ok(())
    }

    /// Build the protocol consumer matching the configured version. Settings
    /// come from the host block, so only `CONFIG_ON_XBLOCK` is accepted.
    pub async fn get_lti_consumer(&mut self, state: &AppState) -> Result<LtiConsumer, LtiError> {
        debug!(
            lti_config_id = self.model.id,
            version = %self.model.version,
            "Selecting LTI consumer"
        );
        if self.model.config_store != ConfigStore::ConfigOnXblock {
            return Err(LtiError::UnsupportedConfigStore(self.model.config_store));
        }
        match self.model.version {
            LtiVersion::Lti1p1 => Ok(LtiConsumer::Lti1p1(
                self.get_lti_1p1_consumer(state.host.as_ref()).await?,
            )),
            LtiVersion::Lti1p3 => Ok(LtiConsumer::Lti1p3(Box::new(
                self.get_lti_1p3_consumer(state).await?,
            ))),
        }
    }

    async fn get_lti_1p1_consumer(
        &mut self,
        host: &dyn HostRuntime,
    ) -> Result<LtiConsumer1p1, LtiError> {
        let block = self.block(host).await?;
        let (key, secret) = block.lti_provider_key_secret();
        Ok(LtiConsumer1p1::new(block.launch_url.clone(), key, secret))
    }

    async fn get_lti_1p3_consumer(
        &mut self,
        state: &AppState,
    ) -> Result<LtiAdvantageConsumer, LtiError> {
        let block = self.block(state.host.as_ref()).await?.clone();
        self.ensure_lti_1p3_keys(&state.db, &state.config.keys).await?;

        let mut consumer = LtiAdvantageConsumer::new(Lti1p3Settings {
            iss: state.config.lms.base_url.clone(),
            lti_oidc_url: block.lti_1p3_oidc_url.clone(),
            lti_launch_url: block.lti_1p3_launch_url.clone(),
            client_id: self.model.lti_1p3_client_id.clone(),
            deployment_id: state.config.lti_1p3.deployment_id.clone(),
            rsa_key: self.model.lti_1p3_internal_private_key.clone(),
            rsa_key_id: self.model.lti_1p3_internal_private_key_id.clone(),
            tool_key: Some(block.lti_1p3_tool_public_key.clone()),
            launch_lifetime_secs: state.config.lti_1p3.launch_lifetime_secs,
            token_lifetime_secs: state.config.lti_1p3.token_lifetime_secs,
        })?;

        if block.has_score {
            let line_item = LineItemService::new(&state.db)
                .get_or_create_for_block(self.model.id, &block)
                .await?;
            let base_url = &state.config.lms.base_url;
            consumer.enable_ags(
                lti_ags_lineitems_url(base_url, self.model.id, None),
                Some(lti_ags_lineitems_url(
                    base_url,
                    self.model.id,
                    Some(line_item.id),
                )),
            );
            debug!(
                lti_config_id = self.model.id,
                line_item_id = line_item.id,
                "Enabled AGS for LTI 1.3 launch"
            );
        }

        Ok(consumer)
    }
}

impl fmt::Display for LtiConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.model, f)
    }
}
