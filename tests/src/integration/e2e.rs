//! The worked end-to-end session example.

#![cfg(test)]

use fireside_dice::{DieSpec, FixedSource, Grade, RollType};
use fireside_engine::adapters::{FixedClock, StaticDefaults, StubBlobStore};
use fireside_engine::operations::dice::RollDiceInput;
use fireside_engine::operations::section::CreateSectionInput;
use fireside_engine::testkit::harness_with_section_quota;
use fireside_engine::{EngineConfig, SessionService};
use fireside_store::{MemoryStore, TransactionalStore};
use futures::future::join_all;
use shared_types::{CoreError, Identity};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_three_sections_race_then_fourth_is_refused() {
    crate::init_tracing();
    let h = Arc::new(harness_with_section_quota(3));
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    // Three concurrent creates against a quota of three all land.
    let tasks: Vec<_> = (0..3)
        .map(|n| {
            let h = Arc::clone(&h);
            let gm = gm.clone();
            let game_id = game.game_id.clone();
            tokio::spawn(async move {
                h.service
                    .create_section(
                        &gm,
                        CreateSectionInput {
                            game_id,
                            user_id: "gm-1".into(),
                            section_name: format!("Section {n}"),
                            section_type: "text".into(),
                            content: "{}".into(),
                            position: n,
                        },
                    )
                    .await
            })
        })
        .collect();
    for result in join_all(tasks).await {
        result.expect("task panicked").expect("create failed");
    }

    // The fourth is a terminal business rejection.
    let err = h
        .service
        .create_section(
            &gm,
            CreateSectionInput {
                game_id: game.game_id.clone(),
                user_id: "gm-1".into(),
                section_name: "One too many".into(),
                section_type: "text".into(),
                content: "{}".into(),
                position: 3,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::QuotaExceeded {
            resource: "sections"
        }
    ));
    assert_eq!(h.sections(&game.game_id).await.len(), 3);
}

#[tokio::test]
async fn test_scripted_percentile_rolls_grade_per_the_table() {
    // Pin the RNG so the d100 lands on 22, 66, 45, 75 in order; the
    // fifth value feeds the message index of each roll.
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at(1_700_000_000_000));
    let rolls = FixedSource::new(vec![
        4, 4, 4, 4, 4, 4, // join-code characters at game creation
        22, 1, // roll + message index
        66, 1, //
        45, 1, //
        75, 1, //
    ]);
    let service = SessionService::new(
        Arc::clone(&store) as Arc<dyn TransactionalStore>,
        clock,
        Arc::new(rolls),
        Arc::new(StaticDefaults::new()),
        Arc::new(StubBlobStore),
    )
    .with_config(EngineConfig::default());

    let gm = Identity::user("gm-1");
    let game = service
        .create_game(
            &gm,
            fireside_engine::operations::game::CreateGameInput {
                name: "Scripted".into(),
                description: "".into(),
                game_type: "investigator".into(),
            },
        )
        .await
        .unwrap();

    let expected = [
        (22, Grade::CriticalSuccess),
        (66, Grade::Fumble),
        (45, Grade::Success),
        (75, Grade::Failure),
    ];
    for (total, grade) in expected {
        let roll = service
            .roll_dice(
                &gm,
                RollDiceInput {
                    game_id: game.game_id.clone(),
                    dice: vec![DieSpec::d100()],
                    roll_type: RollType::Percentile,
                    target: 50,
                    on_behalf_of: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(roll.total, total);
        assert_eq!(roll.grade, grade, "total {total}");
    }
}
