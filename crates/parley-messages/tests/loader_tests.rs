// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema fallback and end-to-end normalization through the loader.

use std::sync::Arc;

use parley_config::model::MediaConfig;
use parley_core::types::{ImageSource, MessageKind, MessagePayload};
use parley_core::RoomId;
use parley_messages::{MessageLoader, SourceSchema};
use parley_test_utils::{fixtures, MockOfficialStore, MockPersonalStore};

fn loader() -> (Arc<MockPersonalStore>, Arc<MockOfficialStore>, MessageLoader) {
    let personal = Arc::new(MockPersonalStore::new());
    let official = Arc::new(MockOfficialStore::new());
    let loader = MessageLoader::new(personal.clone(), official.clone(), MediaConfig::default());
    (personal, official, loader)
}

#[tokio::test]
async fn personal_records_are_used_when_present() {
    let (personal, official, loader) = loader();
    personal
        .set_records(
            "wx01",
            "R1",
            vec![
                fixtures::personal_text("m2", "wx01", "reply", "10:01"),
                fixtures::personal_text("m1", "peer", "question", "10:00"),
            ],
        )
        .await;

    let account = fixtures::account("wx01", "Sales", "");
    let loaded = loader.load(&account, &RoomId::from("R1")).await.unwrap();

    assert_eq!(loaded.schema, SourceSchema::Personal);
    assert_eq!(loaded.messages[0].payload.as_text(), Some("question"));
    assert!(loaded.messages[1].is_from_operator_side);
    assert!(official.queries().await.is_empty());
}

#[tokio::test]
async fn empty_personal_store_falls_back_to_official_rules() {
    let (personal, official, loader) = loader();
    official
        .set_records(
            "wx01",
            vec![
                // Sender id equals the account id, but official records are
                // attributed by message id only.
                fixtures::official_text("user_9", "wx01", "thanks", "10:02"),
                fixtures::official_text("ai_8", "bot", "hello!", "10:01"),
            ],
        )
        .await;

    let account = fixtures::account("wx01", "Sales", "");
    let loaded = loader.load(&account, &RoomId::from("R7")).await.unwrap();

    assert_eq!(loaded.schema, SourceSchema::Official);
    assert_eq!(personal.queries().await.len(), 1);
    assert_eq!(official.queries().await, vec![account.id.clone()]);
    let sides: Vec<bool> = loaded
        .messages
        .iter()
        .map(|m| m.is_from_operator_side)
        .collect();
    assert_eq!(sides, vec![true, false]);
}

#[tokio::test]
async fn xml_thumbnail_scenario_decodes_to_blob() {
    let (personal, _official, loader) = loader();
    let mut record = fixtures::personal_text(
        "m1",
        "peer",
        r#"<?xml version="1.0"?><img cdnthumburl="/9j/4AAQSkZJRgABAQ==" cdnthumbwidth="100" cdnthumbheight="80"/>"#,
        "10:00",
    );
    record.msg_type = 3;
    personal.set_records("wx01", "R1", vec![record]).await;

    let account = fixtures::account("wx01", "Sales", "");
    let loaded = loader.load(&account, &RoomId::from("R1")).await.unwrap();
    let message = &loaded.messages[0];

    assert_eq!(message.kind, MessageKind::Image);
    let MessagePayload::Image(image) = &message.payload else {
        panic!("expected image payload, got {:?}", message.payload);
    };
    assert_eq!((image.width, image.height), (Some(100), Some(80)));
    let ImageSource::Inline { data } = &image.source else {
        panic!("expected inline thumbnail");
    };
    assert_eq!(&data[..3], &[0xff, 0xd8, 0xff]);
}

#[tokio::test]
async fn store_failures_propagate() {
    let (personal, official, loader) = loader();
    let account = fixtures::account("wx01", "Sales", "");

    personal.set_fail(true).await;
    assert!(loader.load(&account, &RoomId::from("R1")).await.is_err());

    personal.set_fail(false).await;
    official.set_fail(true).await;
    let err = loader.load(&account, &RoomId::from("R1")).await.unwrap_err();
    assert!(err.is_transient());
}
