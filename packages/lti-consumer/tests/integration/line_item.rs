use chrono::{Duration, Utc};

use lti_consumer::entity::lti_configuration::LtiVersion;
use lti_consumer::error::LtiError;
use lti_consumer::models::{LineItemService, LtiConfiguration, NewLineItem, NewLtiConfiguration};

use crate::common::{BLOCK_LOCATION, lti_1p3_block, setup};

#[tokio::test]
async fn line_item_display() {
    let ctx = setup().await;
    let item = LineItemService::new(&ctx.state.db)
        .create(NewLineItem {
            resource_id: "test".into(),
            resource_link_id: BLOCK_LOCATION.into(),
            label: "test label".into(),
            score_maximum: 100,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(item.lti_configuration_id, None);
    assert_eq!(
        item.to_string(),
        "block-v1:course+test+2020+type@problem+block@test - test label"
    );
}

#[tokio::test]
async fn line_item_keeps_optional_fields() {
    let ctx = setup().await;
    let config = LtiConfiguration::create(
        &ctx.state.db,
        NewLtiConfiguration {
            version: LtiVersion::Lti1p3,
            location: Some(BLOCK_LOCATION.into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let start = Utc::now();
    let end = start + Duration::days(7);
    let service = LineItemService::new(&ctx.state.db);
    let created = service
        .create(NewLineItem {
            lti_configuration_id: Some(config.id()),
            resource_id: "quiz-1".into(),
            resource_link_id: BLOCK_LOCATION.into(),
            label: "Quiz".into(),
            score_maximum: 20,
            tag: "grade".into(),
            start_date_time: Some(start),
            end_date_time: Some(end),
        })
        .await
        .unwrap();

    let found = service.find(created.id).await.unwrap();
    assert_eq!(found.lti_configuration_id, Some(config.id()));
    assert_eq!(found.tag, "grade");
    assert_eq!(found.score_maximum, 20);
    assert_eq!(
        found.end_date_time.map(|d| d.timestamp()),
        Some(end.timestamp())
    );
}

#[tokio::test]
async fn get_or_create_for_block_is_idempotent() {
    let ctx = setup().await;
    let config = LtiConfiguration::create(&ctx.state.db, NewLtiConfiguration::default())
        .await
        .unwrap();
    let mut block = lti_1p3_block(BLOCK_LOCATION, true);
    block.weight = 2.0;

    let service = LineItemService::new(&ctx.state.db);
    let first = service
        .get_or_create_for_block(config.id(), &block)
        .await
        .unwrap();
    let second = service
        .get_or_create_for_block(config.id(), &block)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.score_maximum, 2);
    assert_eq!(first.label, "LTI Consumer");
}

#[tokio::test]
async fn missing_line_item_is_not_found() {
    let ctx = setup().await;
    let result = LineItemService::new(&ctx.state.db).find(7).await;
    assert!(matches!(result, Err(LtiError::NotFound(_))));
}

#[tokio::test]
async fn line_item_is_unique_per_configuration_and_block() {
    let ctx = setup().await;
    let config = LtiConfiguration::create(&ctx.state.db, NewLtiConfiguration::default())
        .await
        .unwrap();
    let block = lti_1p3_block(BLOCK_LOCATION, true);
    let service = LineItemService::new(&ctx.state.db);

    let (first, second) = tokio::join!(
        service.get_or_create_for_block(config.id(), &block),
        service.get_or_create_for_block(config.id(), &block),
    );
    assert_eq!(first.unwrap().id, second.unwrap().id);

    let duplicate = service
        .create(NewLineItem {
            lti_configuration_id: Some(config.id()),
            resource_link_id: BLOCK_LOCATION.into(),
            label: "duplicate".into(),
            ..Default::default()
        })
        .await;
    assert!(matches!(duplicate, Err(LtiError::Database(_))));

    // Line items outside a configuration may share a block.
    for _ in 0..2 {
        service
            .create(NewLineItem {
                resource_link_id: BLOCK_LOCATION.into(),
                label: "standalone".into(),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let items = service.list_for_configuration(config.id()).await.unwrap();
    assert_eq!(items.len(), 1);
}
