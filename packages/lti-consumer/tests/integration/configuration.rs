use serde_json::json;

use lti_consumer::consumer::LtiConsumer;
use lti_consumer::consumer::constants::{
    AGS_CLAIM_ENDPOINT, AGS_SCOPE_LINEITEM_READONLY, AGS_SCOPE_RESULT_READONLY, AGS_SCOPE_SCORE,
};
use lti_consumer::entity::lti_configuration::{ConfigStore, LtiVersion};
use lti_consumer::error::LtiError;
use lti_consumer::models::{LineItemService, LtiConfiguration, NewLtiConfiguration};

use crate::common::{BLOCK_LOCATION, LMS_BASE_URL, lti_1p1_block, lti_1p3_block, setup};

fn new_config(version: LtiVersion, location: Option<&str>) -> NewLtiConfiguration {
    NewLtiConfiguration {
        version,
        config_store: ConfigStore::ConfigOnXblock,
        location: location.map(str::to_string),
    }
}

#[tokio::test]
async fn lti_1p1_version_builds_lti_1p1_consumer() {
    let ctx = setup().await;
    ctx.host.add_block(lti_1p1_block(BLOCK_LOCATION));

    let mut config = LtiConfiguration::create(
        &ctx.state.db,
        new_config(LtiVersion::Lti1p1, Some(BLOCK_LOCATION)),
    )
    .await
    .unwrap();

    let consumer = config.get_lti_consumer(&ctx.state).await.unwrap();
    assert_eq!(consumer.version(), LtiVersion::Lti1p1);
    let consumer = consumer.as_lti_1p1().unwrap();
    assert_eq!(consumer.launch_url(), "http://tool.example/lti/launch");
    assert_eq!(consumer.oauth_key(), "consumer-key");

    // The LTI 1.3 path would have generated platform keys.
    config.refresh_from_db(&ctx.state.db).await.unwrap();
    assert!(config.internal_private_key().is_empty());
    assert!(config.internal_public_jwk().is_empty());
}

#[tokio::test]
async fn lti_1p3_version_builds_lti_1p3_consumer() {
    let ctx = setup().await;
    ctx.host.add_block(lti_1p3_block(BLOCK_LOCATION, false));

    let mut config = LtiConfiguration::create(
        &ctx.state.db,
        new_config(LtiVersion::Lti1p3, Some(BLOCK_LOCATION)),
    )
    .await
    .unwrap();

    let consumer = config.get_lti_consumer(&ctx.state).await.unwrap();
    assert!(matches!(consumer, LtiConsumer::Lti1p3(_)));
    assert!(consumer.as_lti_1p1().is_none());

    let consumer = consumer.as_lti_1p3().unwrap();
    assert_eq!(consumer.client_id(), config.client_id());
    assert_eq!(consumer.settings().iss, LMS_BASE_URL);
    assert_eq!(
        consumer.settings().lti_launch_url,
        "http://tool.example/lti/1p3/launch"
    );
    assert_eq!(consumer.settings().deployment_id, "1");
    assert!(consumer.ags().is_none());
    assert!(!consumer.extra_claims().contains_key(AGS_CLAIM_ENDPOINT));

    assert!(!config.internal_private_key().is_empty());
    let items = LineItemService::new(&ctx.state.db)
        .list_for_configuration(config.id())
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn configuration_display() {
    let ctx = setup().await;

    let config = LtiConfiguration::create(&ctx.state.db, new_config(LtiVersion::Lti1p3, Some("L")))
        .await
        .unwrap();
    assert_eq!(config.to_string(), "[CONFIG_ON_XBLOCK] lti_1p3 - L");

    let config = LtiConfiguration::create(
        &ctx.state.db,
        NewLtiConfiguration {
            config_store: ConfigStore::ConfigOnDb,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(config.to_string(), "[CONFIG_ON_DB] lti_1p1 - None");
}

#[tokio::test]
async fn gradable_lti_1p3_block_gets_ags_claim() {
    let ctx = setup().await;
    let mut block = lti_1p3_block(BLOCK_LOCATION, true);
    block.display_name = "Graded LTI".into();
    block.weight = 10.0;
    ctx.host.add_block(block);

    // Ids are assigned in insertion order; the second configuration is id 2.
    LtiConfiguration::create(&ctx.state.db, new_config(LtiVersion::Lti1p1, None))
        .await
        .unwrap();
    let mut config = LtiConfiguration::create(
        &ctx.state.db,
        new_config(LtiVersion::Lti1p3, Some(BLOCK_LOCATION)),
    )
    .await
    .unwrap();
    assert_eq!(config.id(), 2);

    let consumer = config.get_lti_consumer(&ctx.state).await.unwrap();
    let consumer = consumer.as_lti_1p3().unwrap();

    assert_eq!(
        consumer.extra_claims()[AGS_CLAIM_ENDPOINT],
        json!({
            "scope": [
                AGS_SCOPE_LINEITEM_READONLY,
                AGS_SCOPE_RESULT_READONLY,
                AGS_SCOPE_SCORE,
            ],
            "lineitems": "https://example.com/api/lti_consumer/v1/lti/2/lti-ags",
            "lineitem": "https://example.com/api/lti_consumer/v1/lti/2/lti-ags/1",
        })
    );

    let items = LineItemService::new(&ctx.state.db)
        .list_for_configuration(config.id())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, 1);
    assert_eq!(items[0].resource_link_id, BLOCK_LOCATION);
    assert_eq!(items[0].label, "Graded LTI");
    assert_eq!(items[0].score_maximum, 10);

    // A second launch reuses the line item.
    let mut reloaded = LtiConfiguration::find(&ctx.state.db, 2).await.unwrap();
    reloaded.get_lti_consumer(&ctx.state).await.unwrap();
    let items = LineItemService::new(&ctx.state.db)
        .list_for_configuration(2)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn keys_are_generated_on_first_access() {
    let ctx = setup().await;
    let keys = &ctx.state.config.keys;
    let mut config =
        LtiConfiguration::create(&ctx.state.db, new_config(LtiVersion::Lti1p3, Some("L")))
            .await
            .unwrap();

    assert!(config.internal_private_key().is_empty());
    assert!(config.internal_private_key_id().is_empty());
    assert!(config.internal_public_jwk().is_empty());

    let jwk = config.public_jwk(&ctx.state.db, keys).await.unwrap();

    assert!(!config.internal_private_key().is_empty());
    assert!(!config.internal_private_key_id().is_empty());
    assert!(!config.internal_public_jwk().is_empty());
    assert_eq!(jwk["kid"], config.internal_private_key_id());
    assert_eq!(jwk["kty"], "RSA");

    // Stored, not only cached.
    let stored = LtiConfiguration::find(&ctx.state.db, config.id())
        .await
        .unwrap();
    assert_eq!(stored.internal_private_key(), config.internal_private_key());
    assert_eq!(stored.internal_public_jwk(), config.internal_public_jwk());
}

#[tokio::test]
async fn cleared_public_jwk_is_regenerated_identically() {
    let ctx = setup().await;
    let keys = &ctx.state.config.keys;
    let mut config =
        LtiConfiguration::create(&ctx.state.db, new_config(LtiVersion::Lti1p3, Some("L")))
            .await
            .unwrap();

    let public_jwk = config.public_jwk(&ctx.state.db, keys).await.unwrap();
    let private_key = config.private_key(&ctx.state.db, keys).await.unwrap();
    let stored_jwk = config.internal_public_jwk().to_string();

    config
        .set_internal_public_jwk(&ctx.state.db, "")
        .await
        .unwrap();
    assert_eq!(
        config.public_jwk(&ctx.state.db, keys).await.unwrap(),
        public_jwk
    );
    assert_eq!(config.internal_public_jwk(), stored_jwk);

    config.refresh_from_db(&ctx.state.db).await.unwrap();
    assert_eq!(config.internal_public_jwk(), stored_jwk);
    assert_eq!(
        config.public_jwk(&ctx.state.db, keys).await.unwrap(),
        public_jwk
    );
    assert_eq!(
        config.private_key(&ctx.state.db, keys).await.unwrap(),
        private_key
    );
}

#[tokio::test]
async fn public_keyset_wraps_public_jwk() {
    let ctx = setup().await;
    let keys = &ctx.state.config.keys;
    let mut config =
        LtiConfiguration::create(&ctx.state.db, new_config(LtiVersion::Lti1p3, Some("L")))
            .await
            .unwrap();

    let keyset = config.get_public_keyset(&ctx.state.db, keys).await.unwrap();
    let jwk = config.public_jwk(&ctx.state.db, keys).await.unwrap();
    assert_eq!(keyset, json!({ "keys": [jwk] }));
}

#[tokio::test]
async fn block_without_location_is_an_error() {
    let ctx = setup().await;

    let mut config = LtiConfiguration::create(&ctx.state.db, new_config(LtiVersion::Lti1p1, None))
        .await
        .unwrap();
    let result = config.block(ctx.state.host.as_ref()).await;
    assert!(matches!(result, Err(LtiError::MissingLocation)));

    let mut config =
        LtiConfiguration::create(&ctx.state.db, new_config(LtiVersion::Lti1p1, Some("")))
            .await
            .unwrap();
    let result = config.block(ctx.state.host.as_ref()).await;
    assert!(matches!(result, Err(LtiError::MissingLocation)));
    assert!(ctx.host.loaded().is_empty());
}

#[tokio::test]
async fn block_is_loaded_once() {
    let ctx = setup().await;
    ctx.host.add_block(lti_1p1_block(BLOCK_LOCATION));
    let mut config = LtiConfiguration::create(
        &ctx.state.db,
        new_config(LtiVersion::Lti1p1, Some(BLOCK_LOCATION)),
    )
    .await
    .unwrap();

    let block = config.block(ctx.state.host.as_ref()).await.unwrap();
    assert_eq!(block.location, BLOCK_LOCATION);
    config.block(ctx.state.host.as_ref()).await.unwrap();
    assert_eq!(ctx.host.loaded(), vec![BLOCK_LOCATION.to_string()]);

    config
        .set_location(&ctx.state.db, Some("other".into()))
        .await
        .unwrap();
    let result = config.block(ctx.state.host.as_ref()).await;
    assert!(matches!(result, Err(LtiError::Host(_))));
}

#[tokio::test]
async fn injected_block_skips_host() {
    let ctx = setup().await;
    let mut config = LtiConfiguration::create(
        &ctx.state.db,
        new_config(LtiVersion::Lti1p1, Some(BLOCK_LOCATION)),
    )
    .await
    .unwrap();

    config.set_block(lti_1p1_block(BLOCK_LOCATION));
    let consumer = config.get_lti_consumer(&ctx.state).await.unwrap();
    assert!(consumer.as_lti_1p1().is_some());
    assert!(ctx.host.loaded().is_empty());
}

#[tokio::test]
async fn missing_configuration_is_not_found() {
    let ctx = setup().await;
    let result = LtiConfiguration::find(&ctx.state.db, 42).await;
    assert!(matches!(result, Err(LtiError::NotFound(_))));
}

#[tokio::test]
async fn config_on_db_is_rejected() {
    let ctx = setup().await;
    ctx.host.add_block(lti_1p3_block(BLOCK_LOCATION, true));
    let mut config = LtiConfiguration::create(
        &ctx.state.db,
        NewLtiConfiguration {
            version: LtiVersion::Lti1p3,
            config_store: ConfigStore::ConfigOnDb,
            location: Some(BLOCK_LOCATION.into()),
        },
    )
    .await
    .unwrap();

    let result = config.get_lti_consumer(&ctx.state).await;
    assert!(matches!(
        result,
        Err(LtiError::UnsupportedConfigStore(ConfigStore::ConfigOnDb))
    ));
    assert!(ctx.host.loaded().is_empty());
    assert!(config.internal_private_key().is_empty());
}
