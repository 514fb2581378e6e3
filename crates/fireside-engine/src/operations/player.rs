//! Player-sheet operations: NPC creation, renames, leaving/removal.

use crate::domain::{RequestContext, Role};
use crate::operations::{map_canceled, SessionService};
use crate::pipeline::stages::{LoadGame, LoadSheet, RequireGameHost, RequireSheetAccess};
use crate::pipeline::{Pipeline, Stage, StageOutcome};
use async_trait::async_trait;
use fireside_store::{Condition, TransactionalStore, UpdateAction, WriteOp, WriteSet};
use serde::{Deserialize, Serialize};
use shared_types::{
    keys, new_id, AttrValue, CoreError, Identity, ItemKey, PlayerSheet, PlayerSheetSummary,
    Section, SheetKind,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNpcInput {
    pub game_id: String,
    pub character_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePlayerSheetInput {
    pub game_id: String,
    pub user_id: String,
    pub character_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePlayerInput {
    pub game_id: String,
    pub user_id: String,
}

impl SessionService {
    /// Creates a GM-controlled NPC sheet, consuming one unit of the
    /// game's character quota.
    pub async fn create_npc(
        &self,
        identity: &Identity,
        input: CreateNpcInput,
    ) -> Result<PlayerSheetSummary, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("create-npc")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameHost)
            .stage(CreateNpcStage {
                store: Arc::clone(&self.store),
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Renames a character; the sheet's owner, or the GM for an NPC.
    pub async fn update_player_sheet(
        &self,
        identity: &Identity,
        input: UpdatePlayerSheetInput,
    ) -> Result<PlayerSheetSummary, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("update-player-sheet")
            .stage(LoadSheet::of(Arc::clone(&self.store), &input.user_id))
            .stage(RequireSheetAccess)
            .stage(UpdatePlayerSheetStage {
                store: Arc::clone(&self.store),
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Removes a sheet and everything it owns: the player leaves (or is
    /// removed by the GM), their sections go with them, and membership
    /// and quota are restored in the same write set.
    pub async fn delete_player(
        &self,
        identity: &Identity,
        input: DeletePlayerInput,
    ) -> Result<PlayerSheetSummary, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("delete-player")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(
                LoadSheet::of(Arc::clone(&self.store), &input.user_id).missing_is_not_found(),
            )
            .stage(RequireLeaveOrKick)
            .stage(DeletePlayerStage {
                store: Arc::clone(&self.store),
            })
            .execute(&mut ctx)
            .await
    }
}

struct CreateNpcStage {
    store: Arc<dyn TransactionalStore>,
    input: CreateNpcInput,
}

#[async_trait]
impl Stage<PlayerSheetSummary> for CreateNpcStage {
    fn name(&self) -> &'static str {
        "create-npc"
    }

    async fn run(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<StageOutcome<PlayerSheetSummary>, CoreError> {
        let game = ctx.game()?;
        let sheet = PlayerSheet {
            game_id: game.game_id.clone(),
            user_id: new_id(),
            kind: SheetKind::Npc,
            character_name: self.input.character_name.clone(),
            game_name: game.name.clone(),
            game_description: game.description.clone(),
            game_type: game.game_type.clone(),
            gm_user_id: game.gm_user_id.clone(),
            remaining_sections: game.remaining_sections,
            created_at: ctx.now,
            updated_at: ctx.now,
        };

        let writes = WriteSet::new()
            .with(WriteOp::put(sheet.key(), sheet.to_item()))
            .with(WriteOp::update_if(
                game.key(),
                vec![
                    UpdateAction::Add("remaining_characters".into(), -1),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(ctx.now as i64)),
                ],
                Condition::positive("remaining_characters"),
            ));

        self.store.transact_write(writes).await.map_err(|e| {
            map_canceled(
                e,
                &[
                    CoreError::Internal("npc id collision".into()),
                    CoreError::QuotaExceeded {
                        resource: "characters",
                    },
                ],
            )
        })?;

        info!(game_id = %sheet.game_id, npc = %sheet.character_name, "npc created");
        Ok(StageOutcome::Done(sheet.summary()))
    }
}

struct UpdatePlayerSheetStage {
    store: Arc<dyn TransactionalStore>,
    input: UpdatePlayerSheetInput,
}

#[async_trait]
impl Stage<PlayerSheetSummary> for UpdatePlayerSheetStage {
    fn name(&self) -> &'static str {
        "update-player-sheet"
    }

    async fn run(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<StageOutcome<PlayerSheetSummary>, CoreError> {
        let sheet = ctx.sheet()?;
        let condition = match ctx.role()? {
            Role::Delegate => Condition::eq_s("sheet_kind", SheetKind::Npc.as_str()),
            _ => Condition::eq_s("user_id", &ctx.identity.sub),
        };

        let updated = self
            .store
            .update_item(
                &sheet.key(),
                vec![
                    UpdateAction::Set(
                        "character_name".into(),
                        AttrValue::s(&self.input.character_name),
                    ),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(ctx.now as i64)),
                ],
                Some(condition),
            )
            .await
            .map_err(|err| match err {
                shared_types::StoreError::ConditionFailed { .. } => {
                    CoreError::ConflictOwnership.public()
                }
                other => CoreError::Store(other),
            })?;
        Ok(StageOutcome::Done(PlayerSheet::from_item(&updated)?.summary()))
    }
}

/// Leaving is allowed for the sheet's own user; kicking (any sheet,
/// including NPCs) for the host.
struct RequireLeaveOrKick;

#[async_trait]
impl Stage<PlayerSheetSummary> for RequireLeaveOrKick {
    fn name(&self) -> &'static str {
        "require-leave-or-kick"
    }

    async fn run(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<StageOutcome<PlayerSheetSummary>, CoreError> {
        let sheet = ctx.sheet()?;
        let game = ctx.game()?;
        let role = if ctx.identity.sub == sheet.user_id {
            Role::Owner
        } else if ctx.identity.sub == game.gm_user_id {
            Role::Delegate
        } else {
            Role::Denied
        };
        if sheet.kind == SheetKind::Gm {
            // The GM sheet is structural; it goes away with the game.
            return Err(CoreError::validation("the GM sheet cannot be removed"));
        }
        ctx.role = Some(role.require(&[Role::Owner, Role::Delegate])?);
        Ok(StageOutcome::Continue)
    }
}

struct DeletePlayerStage {
    store: Arc<dyn TransactionalStore>,
}

#[async_trait]
impl Stage<PlayerSheetSummary> for DeletePlayerStage {
    fn name(&self) -> &'static str {
        "delete-player"
    }

    async fn run(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<StageOutcome<PlayerSheetSummary>, CoreError> {
        let sheet = ctx.sheet()?.clone();
        let game = ctx.game()?;
        let now = ctx.now;

        // The sheet's sections leave with it.
        let sections = self
            .store
            .query_prefix(&game.key().pk, &keys::section_sk_prefix())
            .await?;
        let owned: Vec<ItemKey> = sections
            .iter()
            .filter_map(|item| {
                let section = Section::from_item(item).ok()?;
                (section.user_id == sheet.user_id).then(|| section.key())
            })
            .collect();

        let mut game_actions = vec![UpdateAction::Set(
            "updated_at".into(),
            AttrValue::N(now as i64),
        )];
        match sheet.kind {
            SheetKind::Player => {
                game_actions.push(UpdateAction::DeleteFromSet(
                    "players".into(),
                    sheet.user_id.clone(),
                ));
            }
            SheetKind::Npc => {
                // Mirror of create-npc's decrement.
                game_actions.push(UpdateAction::Add("remaining_characters".into(), 1));
            }
            SheetKind::Gm => {
                return Err(CoreError::validation("the GM sheet cannot be removed"));
            }
        }

        let mut writes = WriteSet::new()
            .with(WriteOp::delete_if(sheet.key(), Condition::ItemExists))
            .with(WriteOp::update(game.key(), game_actions));
        let mut meanings = vec![CoreError::not_found("player sheet"), CoreError::Unauthorized];
        for key in owned {
            writes.push(WriteOp::Delete {
                key,
                condition: None,
            });
            meanings.push(CoreError::Internal("unconditional section delete failed".into()));
        }

        self.store
            .transact_write(writes)
            .await
            .map_err(|e| map_canceled(e, &meanings))?;

        info!(
            game_id = %sheet.game_id,
            user_id = %sheet.user_id,
            kind = ?sheet.kind,
            "player sheet removed"
        );
        Ok(StageOutcome::Done(sheet.summary()))
    }
}
