use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use lti_consumer::compat::{GradePublication, HostRuntime, HostUser, LtiBlock};
use lti_consumer::config::{AppConfig, DatabaseConfig, KeyConfig};
use lti_consumer::database::init_db;
use lti_consumer::entity::lti_configuration::LtiVersion;
use lti_consumer::error::LtiError;
use lti_consumer::state::AppState;

pub const LMS_BASE_URL: &str = "https://example.com";
pub const BLOCK_LOCATION: &str = "block-v1:course+test+2020+type@problem+block@test";

/// In-memory host runtime that records what the consumer asks of it.
#[derive(Default)]
pub struct FakeHost {
    blocks: Mutex<HashMap<String, LtiBlock>>,
    users: Mutex<HashMap<String, HostUser>>,
    loaded: Mutex<Vec<String>>,
    published: Mutex<Vec<GradePublication>>,
}

impl FakeHost {
    pub fn add_block(&self, block: LtiBlock) {
        self.blocks
            .lock()
            .unwrap()
            .insert(block.location.clone(), block);
    }

    pub fn add_user(&self, external_user_id: &str, id: i64) {
        self.users.lock().unwrap().insert(
            external_user_id.to_string(),
            HostUser {
                id,
                username: format!("user{id}"),
            },
        );
    }

    /// Locations loaded so far, in call order.
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<GradePublication> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostRuntime for FakeHost {
    async fn load_block_as_anonymous_user(&self, location: &str) -> Result<LtiBlock, LtiError> {
        self.loaded.lock().unwrap().push(location.to_string());
        self.blocks
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| LtiError::Host(format!("Unknown block {location}")))
    }

    async fn get_user_from_external_user_id(
        &self,
        external_user_id: &str,
    ) -> Result<HostUser, LtiError> {
        self.users
            .lock()
            .unwrap()
            .get(external_user_id)
            .cloned()
            .ok_or_else(|| LtiError::Host(format!("Unknown user {external_user_id}")))
    }

    async fn publish_grade(&self, grade: GradePublication) -> Result<(), LtiError> {
        self.published.lock().unwrap().push(grade);
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout_secs: None,
        },
        // Small keys keep generation fast.
        keys: KeyConfig { rsa_bits: 1024 },
        ..Default::default()
    }
}

pub fn lti_1p1_block(location: &str) -> LtiBlock {
    LtiBlock {
        launch_url: "http://tool.example/lti/launch".into(),
        lti_provider_key: "consumer-key".into(),
        lti_provider_secret: "consumer-secret".into(),
        ..LtiBlock::new(location)
    }
}

pub fn lti_1p3_block(location: &str, has_score: bool) -> LtiBlock {
    LtiBlock {
        lti_version: LtiVersion::Lti1p3,
        lti_1p3_launch_url: "http://tool.example/lti/1p3/launch".into(),
        lti_1p3_oidc_url: "http://tool.example/lti/1p3/login".into(),
        has_score,
        ..LtiBlock::new(location)
    }
}

pub struct TestContext {
    pub state: AppState,
    pub host: Arc<FakeHost>,
}

pub async fn setup() -> TestContext {
    let config = test_config();
    let db = init_db(&config.database)
        .await
        .expect("Failed to initialize test database");
    let host = Arc::new(FakeHost::default());
    let state = AppState::new(db, host.clone(), config);
    TestContext { state, host }
}
