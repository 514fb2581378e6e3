//! Exactly-once quota consumption under concurrency.
//!
//! The defining property of the mutation engine: for a sheet with
//! `remaining_sections = N` and M concurrent create-section calls,
//! exactly `min(N, M)` succeed and every failure creates nothing.

#![cfg(test)]

use fireside_engine::operations::section::{CreateSectionInput, DeleteSectionInput};
use fireside_engine::testkit::{harness_with_quotas, harness_with_section_quota};
use futures::future::join_all;
use shared_types::{CoreError, Identity};
use std::sync::Arc;

fn section_input(game_id: &str, user_id: &str, n: usize) -> CreateSectionInput {
    CreateSectionInput {
        game_id: game_id.into(),
        user_id: user_id.into(),
        section_name: format!("Section {n}"),
        section_type: "text".into(),
        content: "{}".into(),
        position: n as i64,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_creates_respect_quota_exactly() {
    crate::init_tracing();
    let h = Arc::new(harness_with_section_quota(3));
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    let tasks: Vec<_> = (0..10)
        .map(|n| {
            let h = Arc::clone(&h);
            let gm = gm.clone();
            let game_id = game.game_id.clone();
            tokio::spawn(async move {
                h.service
                    .create_section(&gm, section_input(&game_id, "gm-1", n))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut quota_failures = 0;
    for result in join_all(tasks).await {
        match result.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(CoreError::QuotaExceeded {
                resource: "sections",
            }) => quota_failures += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 3);
    assert_eq!(quota_failures, 7);

    // Exactly three rows exist and the counter bottomed out at zero.
    assert_eq!(h.sections(&game.game_id).await.len(), 3);
    let sheet = h
        .sheets(&game.game_id)
        .await
        .into_iter()
        .find(|s| s.user_id == "gm-1")
        .unwrap();
    assert_eq!(sheet.remaining_sections, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fewer_calls_than_quota_all_succeed() {
    let h = Arc::new(harness_with_section_quota(5));
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    let tasks: Vec<_> = (0..3)
        .map(|n| {
            let h = Arc::clone(&h);
            let gm = gm.clone();
            let game_id = game.game_id.clone();
            tokio::spawn(async move {
                h.service
                    .create_section(&gm, section_input(&game_id, "gm-1", n))
                    .await
            })
        })
        .collect();

    for result in join_all(tasks).await {
        result.expect("task panicked").expect("create failed");
    }
    assert_eq!(h.sections(&game.game_id).await.len(), 3);
}

#[tokio::test]
async fn test_delete_create_cycle_is_quota_neutral() {
    let h = harness_with_section_quota(2);
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    let section = h
        .service
        .create_section(&gm, section_input(&game.game_id, "gm-1", 0))
        .await
        .unwrap();
    let counter = |sheets: Vec<shared_types::PlayerSheet>| {
        sheets
            .into_iter()
            .find(|s| s.user_id == "gm-1")
            .unwrap()
            .remaining_sections
    };
    let before = counter(h.sheets(&game.game_id).await);

    h.service
        .delete_section(
            &gm,
            DeleteSectionInput {
                game_id: game.game_id.clone(),
                section_id: section.section_id,
            },
        )
        .await
        .unwrap();
    h.service
        .create_section(&gm, section_input(&game.game_id, "gm-1", 1))
        .await
        .unwrap();

    assert_eq!(counter(h.sheets(&game.game_id).await), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_character_quota_under_concurrent_npc_creation() {
    let h = Arc::new(harness_with_quotas(2, 30, 20));
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    let tasks: Vec<_> = (0..6)
        .map(|n| {
            let h = Arc::clone(&h);
            let gm = gm.clone();
            let game_id = game.game_id.clone();
            tokio::spawn(async move {
                h.service
                    .create_npc(
                        &gm,
                        fireside_engine::operations::player::CreateNpcInput {
                            game_id,
                            character_name: format!("NPC {n}"),
                        },
                    )
                    .await
            })
        })
        .collect();

    let successes = join_all(tasks)
        .await
        .into_iter()
        .filter(|r| r.as_ref().expect("task panicked").is_ok())
        .count();
    assert_eq!(successes, 2);
    assert_eq!(h.game(&game.game_id).await.remaining_characters, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_quota_failures_leave_no_partial_rows() {
    // Drive the counter to zero concurrently, then verify the failed
    // calls left neither section rows nor counter drift behind.
    let h = Arc::new(harness_with_section_quota(1));
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let h = Arc::clone(&h);
            let gm = gm.clone();
            let game_id = game.game_id.clone();
            tokio::spawn(async move {
                h.service
                    .create_section(&gm, section_input(&game_id, "gm-1", n))
                    .await
            })
        })
        .collect();
    join_all(tasks).await;

    let sections = h.sections(&game.game_id).await;
    assert_eq!(sections.len(), 1);
    let sheet = h
        .sheets(&game.game_id)
        .await
        .into_iter()
        .find(|s| s.user_id == "gm-1")
        .unwrap();
    assert_eq!(sheet.remaining_sections, 0);
}
