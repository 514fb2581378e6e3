//! Upload tickets and the asset lifecycle state machine.

#![cfg(test)]

use fireside_engine::operations::asset::{DeleteAssetInput, RequestAssetUploadInput, UploadTicket};
use fireside_engine::operations::section::CreateSectionInput;
use fireside_engine::testkit::{harness, TestHarness};
use shared_types::{AssetStatus, CoreError, Identity, ItemKey};

async fn game_with_gallery(h: &TestHarness, gm: &Identity) -> (String, String) {
    let game = h.create_default_game(gm).await;
    let section = h
        .service
        .create_section(
            gm,
            CreateSectionInput {
                game_id: game.game_id.clone(),
                user_id: gm.sub.clone(),
                section_name: "Gallery".into(),
                section_type: "image".into(),
                content: "{}".into(),
                position: 0,
            },
        )
        .await
        .unwrap();
    (game.game_id, section.section_id)
}

async fn request_upload(
    h: &TestHarness,
    gm: &Identity,
    game_id: &str,
    section_id: &str,
) -> UploadTicket {
    h.service
        .request_asset_upload(
            gm,
            RequestAssetUploadInput {
                game_id: game_id.into(),
                section_id: section_id.into(),
                mime_type: "image/webp".into(),
                size_bytes: 2048,
                label: None,
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_lifecycle_pending_finalising_ready() {
    crate::init_tracing();
    let h = harness();
    let gm = Identity::user("gm-1");
    let pipeline = Identity::service("image-pipeline");
    let (game_id, section_id) = game_with_gallery(&h, &gm).await;
    let ticket = request_upload(&h, &gm, &game_id, &section_id).await;

    assert_eq!(ticket.asset.status, AssetStatus::Pending);
    assert!(ticket.asset.cleanup_at > ticket.asset.created_at);

    let asset = h
        .service
        .finalise_asset(&pipeline, &game_id, &ticket.asset.asset_id)
        .await
        .unwrap();
    assert_eq!(asset.status, AssetStatus::Finalising);

    let asset = h
        .service
        .promote_asset(&pipeline, &game_id, &ticket.asset.asset_id)
        .await
        .unwrap();
    assert_eq!(asset.status, AssetStatus::Ready);
}

#[tokio::test]
async fn test_sweeper_expires_only_pending_uploads() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let sweeper = Identity::service("sweeper");
    let (game_id, section_id) = game_with_gallery(&h, &gm).await;

    let stalled = request_upload(&h, &gm, &game_id, &section_id).await;
    let completed = request_upload(&h, &gm, &game_id, &section_id).await;
    h.service
        .finalise_asset(&sweeper, &game_id, &completed.asset.asset_id)
        .await
        .unwrap();

    let expired = h
        .service
        .expire_asset(&sweeper, &game_id, &stalled.asset.asset_id)
        .await
        .unwrap();
    assert_eq!(expired.status, AssetStatus::Expired);

    let err = h
        .service
        .expire_asset(&sweeper, &game_id, &completed.asset.asset_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ConflictOwnership));
}

#[tokio::test]
async fn test_delete_from_each_deletable_state_restores_quota() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let svc = Identity::service("pipeline");
    let (game_id, section_id) = game_with_gallery(&h, &gm).await;
    let baseline = h.game(&game_id).await.remaining_assets;

    // Pending, Ready, and Expired are all deletable.
    for target in ["pending", "ready", "expired"] {
        let ticket = request_upload(&h, &gm, &game_id, &section_id).await;
        match target {
            "ready" => {
                h.service
                    .finalise_asset(&svc, &game_id, &ticket.asset.asset_id)
                    .await
                    .unwrap();
                h.service
                    .promote_asset(&svc, &game_id, &ticket.asset.asset_id)
                    .await
                    .unwrap();
            }
            "expired" => {
                h.service
                    .expire_asset(&svc, &game_id, &ticket.asset.asset_id)
                    .await
                    .unwrap();
            }
            _ => {}
        }

        h.service
            .delete_asset(
                &gm,
                DeleteAssetInput {
                    game_id: game_id.clone(),
                    section_id: section_id.clone(),
                    asset_id: ticket.asset.asset_id.clone(),
                },
            )
            .await
            .unwrap_or_else(|e| panic!("delete from {target} failed: {e}"));

        assert_eq!(h.game(&game_id).await.remaining_assets, baseline);
        assert!(h
            .item(&ItemKey::asset(&game_id, &ticket.asset.asset_id))
            .await
            .is_none());
    }

    // And the section's asset list is empty again.
    let section = h
        .sections(&game_id)
        .await
        .into_iter()
        .find(|s| s.section_id == section_id)
        .unwrap();
    assert!(section.assets.is_empty());
}

#[tokio::test]
async fn test_finalising_asset_cannot_be_deleted() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let svc = Identity::service("pipeline");
    let (game_id, section_id) = game_with_gallery(&h, &gm).await;
    let ticket = request_upload(&h, &gm, &game_id, &section_id).await;
    h.service
        .finalise_asset(&svc, &game_id, &ticket.asset.asset_id)
        .await
        .unwrap();
    let quota = h.game(&game_id).await.remaining_assets;

    let err = h
        .service
        .delete_asset(
            &gm,
            DeleteAssetInput {
                game_id: game_id.clone(),
                section_id: section_id.clone(),
                asset_id: ticket.asset.asset_id.clone(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ConflictOwnership));

    // Zero side effects: the row, the quota, and the section list all
    // kept their state.
    assert_eq!(h.game(&game_id).await.remaining_assets, quota);
    assert!(h
        .item(&ItemKey::asset(&game_id, &ticket.asset.asset_id))
        .await
        .is_some());
}

#[tokio::test]
async fn test_upload_after_delete_reuses_restored_quota() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let (game_id, section_id) = game_with_gallery(&h, &gm).await;

    let first = request_upload(&h, &gm, &game_id, &section_id).await;
    h.service
        .delete_asset(
            &gm,
            DeleteAssetInput {
                game_id: game_id.clone(),
                section_id: section_id.clone(),
                asset_id: first.asset.asset_id,
            },
        )
        .await
        .unwrap();

    let second = request_upload(&h, &gm, &game_id, &section_id).await;
    let section = h
        .sections(&game_id)
        .await
        .into_iter()
        .find(|s| s.section_id == section_id)
        .unwrap();
    assert_eq!(section.assets, vec![second.asset.asset_id]);
}
