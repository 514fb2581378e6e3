//! Create/join/rename choreography across crates.

#![cfg(test)]

use fireside_engine::operations::game::{CreateGameInput, JoinGameInput, UpdateGameInput};
use fireside_engine::testkit::harness;
use shared_types::{CoreError, Identity, SheetKind};

#[tokio::test]
async fn test_create_game_is_atomic_and_complete() {
    crate::init_tracing();
    let h = harness();
    let gm = Identity::user("gm-1");
    let summary = h
        .service
        .create_game(
            &gm,
            CreateGameInput {
                name: "The Long Drift".into(),
                description: "Salvage run".into(),
                game_type: "skyfarer".into(),
            },
        )
        .await
        .unwrap();

    // Exactly one GM sheet plus the configured default NPC.
    let sheets = h.sheets(&summary.game_id).await;
    let gms = sheets.iter().filter(|s| s.kind == SheetKind::Gm).count();
    let npcs = sheets.iter().filter(|s| s.kind == SheetKind::Npc).count();
    assert_eq!(gms, 1);
    assert_eq!(npcs, 1);

    // Quotas initialized from the defaults.
    let game = h.game(&summary.game_id).await;
    assert_eq!(game.remaining_characters, 10);
    assert_eq!(game.remaining_assets, 20);
    assert!(game.players.is_empty());
}

#[tokio::test]
async fn test_investigator_games_have_no_default_npcs() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let summary = h
        .service
        .create_game(
            &gm,
            CreateGameInput {
                name: "Night Shift".into(),
                description: "".into(),
                game_type: "investigator".into(),
            },
        )
        .await
        .unwrap();
    let sheets = h.sheets(&summary.game_id).await;
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].kind, SheetKind::Gm);
    assert_eq!(sheets[0].character_name, "Handler");
}

#[tokio::test]
async fn test_unknown_game_type_creates_nothing() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let err = h
        .service
        .create_game(
            &gm,
            CreateGameInput {
                name: "Mystery".into(),
                description: "".into(),
                game_type: "chess".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_membership_gates_reads_before_and_after_join() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let player = Identity::user("p-1");
    let game = h.create_default_game(&gm).await;

    let err = h.service.get_game(&player, &game.game_id).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized));

    h.service
        .join_game(
            &player,
            JoinGameInput::ByCode {
                join_code: game.join_code.clone().unwrap(),
            },
        )
        .await
        .unwrap();

    // The very next read succeeds.
    h.service.get_game(&player, &game.game_id).await.unwrap();
    assert!(h.game(&game.game_id).await.players.contains("p-1"));
}

#[tokio::test]
async fn test_join_stamps_denormalized_game_shadow() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let player = Identity::user("p-1");
    let game = h.create_default_game(&gm).await;
    h.service
        .join_game(
            &player,
            JoinGameInput::ByCode {
                join_code: game.join_code.clone().unwrap(),
            },
        )
        .await
        .unwrap();

    let sheet = h
        .sheets(&game.game_id)
        .await
        .into_iter()
        .find(|s| s.user_id == "p-1")
        .unwrap();
    assert_eq!(sheet.kind, SheetKind::Player);
    assert_eq!(sheet.game_name, game.name);
    assert_eq!(sheet.character_name, "Unnamed Character");
}

#[tokio::test]
async fn test_rename_cascades_to_every_sheet_and_token_join_still_works() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let p1 = Identity::user("p-1");
    let p2 = Identity::user("p-2");
    let game = h.create_default_game(&gm).await;
    let code = game.join_code.clone().unwrap();

    h.service
        .join_game(&p1, JoinGameInput::ByCode { join_code: code })
        .await
        .unwrap();

    h.service
        .update_game(
            &gm,
            UpdateGameInput {
                game_id: game.game_id.clone(),
                name: "Second Voyage".into(),
                description: "Further out".into(),
            },
        )
        .await
        .unwrap();

    for sheet in h.sheets(&game.game_id).await {
        assert_eq!(sheet.game_name, "Second Voyage");
    }

    // The legacy token survives renames; a late joiner sees the new name.
    let token = h.game(&game.game_id).await.join_token;
    h.service
        .join_game(
            &p2,
            JoinGameInput::ByToken {
                game_id: game.game_id.clone(),
                join_token: token,
            },
        )
        .await
        .unwrap();
    let sheet = h
        .sheets(&game.game_id)
        .await
        .into_iter()
        .find(|s| s.user_id == "p-2")
        .unwrap();
    assert_eq!(sheet.game_name, "Second Voyage");
}

#[tokio::test]
async fn test_get_games_reflects_memberships_only() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let player = Identity::user("p-1");
    let outsider = Identity::user("nobody");

    let a = h.create_default_game(&gm).await;
    let _b = h.create_default_game(&gm).await;
    h.service
        .join_game(
            &player,
            JoinGameInput::ByCode {
                join_code: a.join_code.clone().unwrap(),
            },
        )
        .await
        .unwrap();

    assert_eq!(h.service.get_games(&gm).await.unwrap().len(), 2);
    let player_games = h.service.get_games(&player).await.unwrap();
    assert_eq!(player_games.len(), 1);
    assert_eq!(player_games[0].game_id, a.game_id);
    assert!(h.service.get_games(&outsider).await.unwrap().is_empty());
}
