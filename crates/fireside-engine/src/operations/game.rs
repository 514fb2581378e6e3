//! Game operations: create, join, rename, join-code rotation, reads.

use crate::domain::{join_code, RequestContext};
use crate::operations::{map_canceled, SessionService};
use crate::pipeline::stages::{LoadGame, RequireGameHost, RequireGameMember};
use crate::pipeline::{Pipeline, Stage, StageOutcome};
use crate::ports::DefaultsProvider;
use crate::RejoinPolicy;
use async_trait::async_trait;
use fireside_dice::RandomSource;
use fireside_store::{Condition, TransactionalStore, UpdateAction, WriteOp, WriteSet};
use serde::{Deserialize, Serialize};
use shared_types::{
    keys, new_id, AttrValue, CoreError, Game, GameSummary, Identity, ItemKey, PlayerSheet,
    SheetKind,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameInput {
    pub name: String,
    pub description: String,
    pub game_type: String,
}

/// How a joiner proves they were invited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JoinGameInput {
    /// Six-character code shared out-of-band.
    ByCode { join_code: String },
    /// Legacy invite link carrying the game id and its join token.
    ByToken { game_id: String, join_token: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGameInput {
    pub game_id: String,
    pub name: String,
    pub description: String,
}

impl SessionService {
    /// Creates a game: the Game row, the GM sheet, and one sheet per
    /// configured default NPC, all present atomically or not at all.
    pub async fn create_game(
        &self,
        identity: &Identity,
        input: CreateGameInput,
    ) -> Result<GameSummary, CoreError> {
        let mut ctx = RequestContext::new(identity.clone(), self.clock.now());
        Pipeline::new("create-game")
            .stage(CreateGameStage {
                store: Arc::clone(&self.store),
                defaults: Arc::clone(&self.defaults),
                rng: Arc::clone(&self.rng),
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Adds the caller to a game by join code or legacy token.
    pub async fn join_game(
        &self,
        identity: &Identity,
        input: JoinGameInput,
    ) -> Result<GameSummary, CoreError> {
        let mut ctx = RequestContext::new(identity.clone(), self.clock.now());
        Pipeline::new("join-game")
            .stage(ResolveJoinTarget {
                store: Arc::clone(&self.store),
                input: input.clone(),
            })
            .stage(JoinGameStage {
                store: Arc::clone(&self.store),
                defaults: Arc::clone(&self.defaults),
                rejoin_policy: self.config.rejoin_policy,
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Renames a game and fans the new name out to every sheet.
    pub async fn update_game(
        &self,
        identity: &Identity,
        input: UpdateGameInput,
    ) -> Result<GameSummary, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("update-game")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameHost)
            .stage(UpdateGameStage {
                store: Arc::clone(&self.store),
                max_transact_items: self.config.max_transact_items,
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Rotates the join code. The old code stops resolving the moment
    /// the update commits because the index entry is derived from the
    /// current attribute value.
    pub async fn update_join_code(
        &self,
        identity: &Identity,
        game_id: &str,
    ) -> Result<GameSummary, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), game_id);
        Pipeline::new("update-join-code")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameHost)
            .stage(UpdateJoinCodeStage {
                store: Arc::clone(&self.store),
                rng: Arc::clone(&self.rng),
            })
            .execute(&mut ctx)
            .await
    }

    /// Reads one game; members only.
    pub async fn get_game(
        &self,
        identity: &Identity,
        game_id: &str,
    ) -> Result<GameSummary, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), game_id);
        Pipeline::new("get-game")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameMember)
            .stage(ReturnGameSummary)
            .execute(&mut ctx)
            .await
    }

    /// Lists every game the caller holds a sheet in. The only transient
    /// retries in the engine live on read paths like this one; mutations
    /// are never resubmitted.
    pub async fn get_games(&self, identity: &Identity) -> Result<Vec<GameSummary>, CoreError> {
        let index_value = keys::user_index_value(&identity.sub);
        let items = fireside_store::retry::RetryPolicy::default()
            .read(|| self.store.query_index(keys::INDEX_ATTR, &index_value))
            .await?;
        let mut games = Vec::with_capacity(items.len());
        for item in &items {
            let sheet = PlayerSheet::from_item(item)?;
            games.push(GameSummary {
                game_id: sheet.game_id.clone(),
                name: sheet.game_name.clone(),
                description: sheet.game_description.clone(),
                game_type: sheet.game_type.clone(),
                gm_user_id: sheet.gm_user_id.clone(),
                join_code: None,
                created_at: sheet.created_at,
                updated_at: sheet.updated_at,
            });
        }
        games.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        Ok(games)
    }
}

struct CreateGameStage {
    store: Arc<dyn TransactionalStore>,
    defaults: Arc<dyn DefaultsProvider>,
    rng: Arc<dyn RandomSource>,
    input: CreateGameInput,
}

#[async_trait]
impl Stage<GameSummary> for CreateGameStage {
    fn name(&self) -> &'static str {
        "create-game"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<GameSummary>, CoreError> {
        if self.input.name.trim().is_empty() {
            return Err(CoreError::validation("game name must not be empty"));
        }

        let defaults = self.defaults.game_defaults(&self.input.game_type).await?;
        let game_id = new_id();
        let now = ctx.now;

        let game = Game {
            game_id: game_id.clone(),
            name: self.input.name.clone(),
            description: self.input.description.clone(),
            game_type: self.input.game_type.clone(),
            gm_user_id: ctx.identity.sub.clone(),
            join_code: join_code::generate(self.rng.as_ref()),
            join_token: new_id(),
            players: BTreeSet::new(),
            remaining_characters: defaults.remaining_characters,
            remaining_sections: defaults.remaining_sections,
            remaining_assets: defaults.remaining_assets,
            created_at: now,
            updated_at: now,
        };

        let gm_sheet = PlayerSheet {
            game_id: game_id.clone(),
            user_id: ctx.identity.sub.clone(),
            kind: SheetKind::Gm,
            character_name: defaults.gm_character_name.clone(),
            game_name: game.name.clone(),
            game_description: game.description.clone(),
            game_type: game.game_type.clone(),
            gm_user_id: game.gm_user_id.clone(),
            remaining_sections: defaults.remaining_sections,
            created_at: now,
            updated_at: now,
        };

        let mut writes = WriteSet::new()
            .with(WriteOp::put_if(
                game.key(),
                game.to_item(),
                Condition::ItemNotExists,
            ))
            .with(WriteOp::put(gm_sheet.key(), gm_sheet.to_item()));
        let mut meanings = vec![
            CoreError::Internal("game id collision".into()),
            CoreError::Internal("gm sheet collision".into()),
        ];

        for npc in &defaults.default_npcs {
            let sheet = PlayerSheet {
                user_id: new_id(),
                kind: SheetKind::Npc,
                character_name: npc.character_name.clone(),
                ..gm_sheet.clone()
            };
            writes.push(WriteOp::put(sheet.key(), sheet.to_item()));
            meanings.push(CoreError::Internal("npc sheet collision".into()));
        }

        self.store
            .transact_write(writes)
            .await
            .map_err(|e| map_canceled(e, &meanings))?;

        info!(
            game_id = %game.game_id,
            game_type = %game.game_type,
            npcs = defaults.default_npcs.len(),
            "game created"
        );

        let mut summary = game.summary();
        summary.join_code = Some(game.join_code.clone());
        Ok(StageOutcome::Done(summary))
    }
}

/// Resolves the join target and verifies the presented capability.
struct ResolveJoinTarget {
    store: Arc<dyn TransactionalStore>,
    input: JoinGameInput,
}

#[async_trait]
impl Stage<GameSummary> for ResolveJoinTarget {
    fn name(&self) -> &'static str {
        "resolve-join-target"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<GameSummary>, CoreError> {
        let game = match &self.input {
            JoinGameInput::ByCode { join_code } => {
                let items = self
                    .store
                    .query_index(keys::INDEX_ATTR, &keys::join_index_value(join_code))
                    .await?;
                let item = items.first().ok_or_else(|| CoreError::not_found("game"))?;
                Game::from_item(item)?
            }
            JoinGameInput::ByToken {
                game_id,
                join_token,
            } => {
                let item = self
                    .store
                    .get(&ItemKey::game(game_id))
                    .await?
                    .ok_or_else(|| CoreError::not_found("game"))?;
                let game = Game::from_item(&item)?;
                if game.join_token != *join_token {
                    return Err(CoreError::Unauthorized);
                }
                game
            }
        };
        ctx.game_id = Some(game.game_id.clone());
        ctx.game = Some(game);
        Ok(StageOutcome::Continue)
    }
}

struct JoinGameStage {
    store: Arc<dyn TransactionalStore>,
    defaults: Arc<dyn DefaultsProvider>,
    rejoin_policy: RejoinPolicy,
    input: JoinGameInput,
}

#[async_trait]
impl Stage<GameSummary> for JoinGameStage {
    fn name(&self) -> &'static str {
        "join-game"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<GameSummary>, CoreError> {
        let game = ctx.game()?.clone();
        let sub = ctx.identity.sub.clone();

        if sub == game.gm_user_id {
            return Err(CoreError::validation("the host is already in their game"));
        }
        if game.players.contains(&sub) && self.rejoin_policy == RejoinPolicy::Preserve {
            // Idempotent re-join: membership already holds, the
            // existing character is kept.
            return Ok(StageOutcome::Done(game.summary()));
        }

        let defaults = self.defaults.game_defaults(&game.game_type).await?;
        let sheet = PlayerSheet {
            game_id: game.game_id.clone(),
            user_id: sub.clone(),
            kind: SheetKind::Player,
            character_name: defaults.default_character_name.clone(),
            game_name: game.name.clone(),
            game_description: game.description.clone(),
            game_type: game.game_type.clone(),
            gm_user_id: game.gm_user_id.clone(),
            remaining_sections: game.remaining_sections,
            created_at: ctx.now,
            updated_at: ctx.now,
        };

        // Re-assert the presented capability at write time; a rotation
        // between read and write aborts the join.
        let capability = match &self.input {
            JoinGameInput::ByCode { join_code } => Condition::eq_s("join_code", join_code),
            JoinGameInput::ByToken { join_token, .. } => {
                Condition::eq_s("join_token", join_token)
            }
        };

        let writes = WriteSet::new()
            .with(WriteOp::update_if(
                game.key(),
                vec![
                    UpdateAction::AddToSet("players".into(), sub.clone()),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(ctx.now as i64)),
                ],
                capability,
            ))
            .with(WriteOp::put(sheet.key(), sheet.to_item()));

        self.store
            .transact_write(writes)
            .await
            .map_err(|e| map_canceled(e, &[CoreError::Unauthorized, CoreError::Unauthorized]))?;

        info!(game_id = %game.game_id, "player joined game");
        Ok(StageOutcome::Done(game.summary()))
    }
}

struct UpdateGameStage {
    store: Arc<dyn TransactionalStore>,
    max_transact_items: usize,
    input: UpdateGameInput,
}

#[async_trait]
impl Stage<GameSummary> for UpdateGameStage {
    fn name(&self) -> &'static str {
        "update-game"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<GameSummary>, CoreError> {
        let game = ctx.game()?;
        let now = ctx.now;

        let updated = self
            .store
            .update_item(
                &game.key(),
                vec![
                    UpdateAction::Set("game_name".into(), AttrValue::s(&self.input.name)),
                    UpdateAction::Set(
                        "game_description".into(),
                        AttrValue::s(&self.input.description),
                    ),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(now as i64)),
                ],
                Some(Condition::eq_s("gm_user_id", &ctx.identity.sub)),
            )
            .await
            .map_err(|err| match err {
                shared_types::StoreError::ConditionFailed { .. } => CoreError::Unauthorized,
                other => CoreError::Store(other),
            })?;
        let updated = Game::from_item(&updated)?;

        // Fan the denormalized name out to every sheet as a logically
        // separate transaction, chunked to the write-set limit.
        let items = self
            .store
            .query_prefix(&updated.key().pk, &keys::player_sk_prefix())
            .await?;
        let sheets = items
            .iter()
            .map(PlayerSheet::from_item)
            .collect::<Result<Vec<_>, _>>()?;
        for chunk in sheets.chunks(self.max_transact_items) {
            let writes: WriteSet = chunk
                .iter()
                .map(|sheet| {
                    WriteOp::update_if(
                        sheet.key(),
                        vec![
                            UpdateAction::Set("game_name".into(), AttrValue::s(&self.input.name)),
                            UpdateAction::Set(
                                "game_description".into(),
                                AttrValue::s(&self.input.description),
                            ),
                            UpdateAction::Set("updated_at".into(), AttrValue::N(now as i64)),
                        ],
                        Condition::ItemExists,
                    )
                })
                .collect();
            self.store
                .transact_write(writes)
                .await
                .map_err(|err| match err.failed_op_index() {
                    Some(_) => CoreError::ConflictOwnership,
                    None => CoreError::Store(err),
                })?;
        }

        info!(game_id = %updated.game_id, sheets = sheets.len(), "game renamed");
        Ok(StageOutcome::Done(updated.summary()))
    }
}

struct UpdateJoinCodeStage {
    store: Arc<dyn TransactionalStore>,
    rng: Arc<dyn RandomSource>,
}

#[async_trait]
impl Stage<GameSummary> for UpdateJoinCodeStage {
    fn name(&self) -> &'static str {
        "update-join-code"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<GameSummary>, CoreError> {
        let game = ctx.game()?;
        let new_code = join_code::generate(self.rng.as_ref());

        let updated = self
            .store
            .update_item(
                &game.key(),
                vec![
                    UpdateAction::Set("join_code".into(), AttrValue::s(&new_code)),
                    UpdateAction::Set(
                        keys::INDEX_ATTR.into(),
                        AttrValue::s(keys::join_index_value(&new_code)),
                    ),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(ctx.now as i64)),
                ],
                Some(Condition::eq_s("gm_user_id", &ctx.identity.sub)),
            )
            .await
            .map_err(|err| match err {
                shared_types::StoreError::ConditionFailed { .. } => CoreError::Unauthorized,
                other => CoreError::Store(other),
            })?;
        let updated = Game::from_item(&updated)?;

        info!(game_id = %updated.game_id, "join code rotated");
        let mut summary = updated.summary();
        summary.join_code = Some(updated.join_code.clone());
        Ok(StageOutcome::Done(summary))
    }
}

/// Terminal stage of the read path.
struct ReturnGameSummary;

#[async_trait]
impl Stage<GameSummary> for ReturnGameSummary {
    fn name(&self) -> &'static str {
        "return-game"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<GameSummary>, CoreError> {
        Ok(StageOutcome::Done(ctx.game()?.summary()))
    }
}
