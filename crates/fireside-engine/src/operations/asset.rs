//! Asset operations: upload tickets, lifecycle transitions, deletion.

use crate::assets::lifecycle::{delete_condition, AssetTransition};
use crate::domain::{RequestContext, Role};
use crate::operations::{map_canceled, SessionService};
use crate::pipeline::stages::{
    LoadGame, LoadSection, RequireGameMember, RequireSectionAccess, RequireService,
};
use crate::pipeline::{Pipeline, Stage, StageOutcome};
use crate::ports::BlobStore;
use async_trait::async_trait;
use fireside_store::{Condition, TransactionalStore, UpdateAction, WriteOp, WriteSet};
use serde::{Deserialize, Serialize};
use shared_types::{
    new_id, Asset, AssetStatus, AttrValue, CoreError, Identity, ItemKey, Timestamp,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestAssetUploadInput {
    pub game_id: String,
    pub section_id: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAssetInput {
    pub game_id: String,
    pub section_id: String,
    pub asset_id: String,
}

/// Everything a client needs to upload the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub asset: Asset,
    pub upload_url: String,
    pub expires_secs: u64,
}

impl SessionService {
    /// Issues an upload ticket: creates the Pending asset row, consumes
    /// one unit of the game's asset quota, and appends the asset id to
    /// its section, all in one write set.
    pub async fn request_asset_upload(
        &self,
        identity: &Identity,
        input: RequestAssetUploadInput,
    ) -> Result<UploadTicket, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("request-asset-upload")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameMember)
            .stage(LoadSection::new(Arc::clone(&self.store), &input.section_id))
            .stage(RequestAssetUploadStage {
                store: Arc::clone(&self.store),
                blobs: Arc::clone(&self.blobs),
                config: self.config.clone(),
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Upload confirmed; the asset enters variant generation.
    /// Service principals only (the upload-completion hook).
    pub async fn finalise_asset(
        &self,
        identity: &Identity,
        game_id: &str,
        asset_id: &str,
    ) -> Result<Asset, CoreError> {
        self.transition_asset(identity, game_id, asset_id, AssetTransition::Finalise)
            .await
    }

    /// Variant generation finished; the asset becomes Ready.
    pub async fn promote_asset(
        &self,
        identity: &Identity,
        game_id: &str,
        asset_id: &str,
    ) -> Result<Asset, CoreError> {
        self.transition_asset(identity, game_id, asset_id, AssetTransition::Promote)
            .await
    }

    /// The external sweeper gives up on a Pending upload.
    pub async fn expire_asset(
        &self,
        identity: &Identity,
        game_id: &str,
        asset_id: &str,
    ) -> Result<Asset, CoreError> {
        self.transition_asset(identity, game_id, asset_id, AssetTransition::Expire)
            .await
    }

    async fn transition_asset(
        &self,
        identity: &Identity,
        game_id: &str,
        asset_id: &str,
        transition: AssetTransition,
    ) -> Result<Asset, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), game_id);
        Pipeline::new("transition-asset")
            .stage(RequireService)
            .stage(TransitionAssetStage {
                store: Arc::clone(&self.store),
                asset_id: asset_id.to_owned(),
                transition,
            })
            .execute(&mut ctx)
            .await
    }

    /// Deletes an asset, restoring one unit of asset quota and
    /// detaching the id from its section in the same write set.
    /// Refused while the asset is Finalising.
    pub async fn delete_asset(
        &self,
        identity: &Identity,
        input: DeleteAssetInput,
    ) -> Result<Asset, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        let gate: Box<dyn Stage<Asset>> = if self.config.gm_asset_override {
            Box::new(RequireSectionAccessOrHost)
        } else {
            Box::new(RequireSectionAccess)
        };
        Pipeline::new("delete-asset")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameMember)
            .stage(LoadSection::new(Arc::clone(&self.store), &input.section_id))
            .stage_boxed(gate)
            .stage(DeleteAssetStage {
                store: Arc::clone(&self.store),
                input,
            })
            .execute(&mut ctx)
            .await
    }
}

struct RequestAssetUploadStage {
    store: Arc<dyn TransactionalStore>,
    blobs: Arc<dyn BlobStore>,
    config: crate::EngineConfig,
    input: RequestAssetUploadInput,
}

#[async_trait]
impl Stage<UploadTicket> for RequestAssetUploadStage {
    fn name(&self) -> &'static str {
        "request-asset-upload"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<UploadTicket>, CoreError> {
        // Validation happens before any write set exists.
        if !self
            .config
            .allowed_asset_mime_types
            .iter()
            .any(|m| m == &self.input.mime_type)
        {
            return Err(CoreError::validation(format!(
                "mime type {} is not allowed",
                self.input.mime_type
            )));
        }
        if self.input.size_bytes <= 0 || self.input.size_bytes > self.config.max_asset_size_bytes {
            return Err(CoreError::validation(format!(
                "size {} outside (0, {}]",
                self.input.size_bytes, self.config.max_asset_size_bytes
            )));
        }

        let section = ctx.section()?;
        let game = ctx.game()?;
        let asset_id = new_id();
        let now: Timestamp = ctx.now;
        let original_key = format!(
            "asset/game/{}/section/{}/{}/original",
            game.game_id, section.section_id, asset_id
        );
        let asset = Asset {
            game_id: game.game_id.clone(),
            asset_id: asset_id.clone(),
            section_id: section.section_id.clone(),
            status: AssetStatus::Pending,
            mime_type: self.input.mime_type.clone(),
            size_bytes: self.input.size_bytes,
            label: self.input.label.clone(),
            bucket: self.config.asset_bucket.clone(),
            original_key: original_key.clone(),
            variants_prefix: format!(
                "asset/game/{}/section/{}/{}/variants/",
                game.game_id, section.section_id, asset_id
            ),
            cleanup_at: now + self.config.asset_cleanup_timeout_ms,
            created_at: now,
            updated_at: now,
        };

        let writes = WriteSet::new()
            .with(WriteOp::put(asset.key(), asset.to_item()))
            .with(WriteOp::update_if(
                game.key(),
                vec![
                    UpdateAction::Add("remaining_assets".into(), -1),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(now as i64)),
                ],
                Condition::positive("remaining_assets"),
            ))
            .with(WriteOp::update_if(
                section.key(),
                vec![
                    UpdateAction::ListAppend("assets".into(), AttrValue::s(&asset_id)),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(now as i64)),
                ],
                Condition::eq_s("user_id", &ctx.identity.sub),
            ));

        self.store.transact_write(writes).await.map_err(|e| {
            map_canceled(
                e,
                &[
                    CoreError::Internal("asset id collision".into()),
                    CoreError::QuotaExceeded { resource: "assets" },
                    CoreError::Unauthorized,
                ],
            )
        })?;

        let upload_url = self
            .blobs
            .issue_upload_url(
                &asset.bucket,
                &original_key,
                &asset.mime_type,
                self.config.upload_url_expires_secs,
            )
            .await?;

        info!(
            game_id = %asset.game_id,
            asset_id = %asset.asset_id,
            mime = %asset.mime_type,
            "asset upload requested"
        );
        Ok(StageOutcome::Done(UploadTicket {
            asset,
            upload_url,
            expires_secs: self.config.upload_url_expires_secs,
        }))
    }
}

struct TransitionAssetStage {
    store: Arc<dyn TransactionalStore>,
    asset_id: String,
    transition: AssetTransition,
}

#[async_trait]
impl Stage<Asset> for TransitionAssetStage {
    fn name(&self) -> &'static str {
        "transition-asset"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<Asset>, CoreError> {
        let game_id = ctx.game_id()?.to_owned();
        let key = ItemKey::asset(&game_id, &self.asset_id);
        let (actions, condition) = self.transition.update(ctx.now);

        let updated = self
            .store
            .update_item(&key, actions, Some(condition))
            .await
            .map_err(|err| match err {
                // Wrong prior state, or the row is gone.
                shared_types::StoreError::ConditionFailed { .. } => CoreError::ConflictOwnership,
                other => CoreError::Store(other),
            })?;
        let asset = Asset::from_item(&updated)?;
        info!(
            game_id = %asset.game_id,
            asset_id = %asset.asset_id,
            status = asset.status.as_str(),
            "asset transitioned"
        );
        Ok(StageOutcome::Done(asset))
    }
}

/// Section gate that additionally admits the host when the GM-override
/// policy is enabled.
struct RequireSectionAccessOrHost;

#[async_trait]
impl Stage<Asset> for RequireSectionAccessOrHost {
    fn name(&self) -> &'static str {
        "require-section-access-or-host"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<Asset>, CoreError> {
        if ctx.is_gm() {
            ctx.role = Some(Role::Delegate);
            return Ok(StageOutcome::Continue);
        }
        RequireSectionAccess.run(ctx).await
    }
}

struct DeleteAssetStage {
    store: Arc<dyn TransactionalStore>,
    input: DeleteAssetInput,
}

#[async_trait]
impl Stage<Asset> for DeleteAssetStage {
    fn name(&self) -> &'static str {
        "delete-asset"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<Asset>, CoreError> {
        let section = ctx.section()?;
        let game = ctx.game()?;
        let now = ctx.now;

        let asset_key = ItemKey::asset(&game.game_id, &self.input.asset_id);
        let asset_item = self
            .store
            .get(&asset_key)
            .await?
            .ok_or_else(|| CoreError::not_found("asset"))?;
        let asset = Asset::from_item(&asset_item)?;

        let section_condition = match ctx.role()? {
            // Host override (config-gated) or NPC delegate: the row
            // only needs to still exist.
            Role::Delegate => Condition::ItemExists,
            _ => Condition::eq_s("user_id", &ctx.identity.sub),
        };

        let writes = WriteSet::new()
            .with(WriteOp::delete_if(
                asset_key,
                delete_condition(&section.section_id),
            ))
            .with(WriteOp::update(
                game.key(),
                vec![
                    UpdateAction::Add("remaining_assets".into(), 1),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(now as i64)),
                ],
            ))
            .with(WriteOp::update_if(
                section.key(),
                vec![
                    UpdateAction::ListRemove("assets".into(), AttrValue::s(&self.input.asset_id)),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(now as i64)),
                ],
                section_condition,
            ));

        self.store.transact_write(writes).await.map_err(|e| {
            map_canceled(
                e,
                &[
                    CoreError::ConflictOwnership,
                    CoreError::Internal("unconditional quota restore failed".into()),
                    CoreError::Unauthorized,
                ],
            )
        })?;

        info!(
            game_id = %asset.game_id,
            asset_id = %asset.asset_id,
            "asset deleted"
        );
        Ok(StageOutcome::Done(asset))
    }
}
