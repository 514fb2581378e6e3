//! Reusable access-gate stages.
//!
//! Each stage loads an entity or resolves a role and writes it into the
//! context for every later stage to reuse. Denials become
//! `Unauthorized` before any mutation is attempted.

use crate::domain::roles::{game_role, section_role, sheet_role, Role};
use crate::domain::RequestContext;
use crate::pipeline::{Stage, StageOutcome};
use async_trait::async_trait;
use fireside_store::TransactionalStore;
use shared_types::{CoreError, Game, ItemKey, PlayerSheet, Section};
use std::sync::Arc;

/// Loads the Game row for `ctx.game_id`.
pub struct LoadGame {
    store: Arc<dyn TransactionalStore>,
}

impl LoadGame {
    pub fn new(store: Arc<dyn TransactionalStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<R: Send + 'static> Stage<R> for LoadGame {
    fn name(&self) -> &'static str {
        "load-game"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        let game_id = ctx.game_id()?.to_owned();
        let item = self
            .store
            .get(&ItemKey::game(&game_id))
            .await?
            .ok_or_else(|| CoreError::not_found("game"))?;
        ctx.game = Some(Game::from_item(&item)?);
        Ok(StageOutcome::Continue)
    }
}

/// Requires the caller to be the game's host or a listed player, and
/// records the resolved role.
pub struct RequireGameMember;

#[async_trait]
impl<R: Send + 'static> Stage<R> for RequireGameMember {
    fn name(&self) -> &'static str {
        "require-game-member"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        let role = game_role(&ctx.identity, ctx.game()?);
        ctx.role = Some(role.require(&[Role::Owner, Role::Member])?);
        Ok(StageOutcome::Continue)
    }
}

/// Requires the caller to be the game's host.
pub struct RequireGameHost;

#[async_trait]
impl<R: Send + 'static> Stage<R> for RequireGameHost {
    fn name(&self) -> &'static str {
        "require-game-host"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        let role = game_role(&ctx.identity, ctx.game()?);
        ctx.role = Some(role.require(&[Role::Owner])?);
        Ok(StageOutcome::Continue)
    }
}

/// How a missing target sheet is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSheet {
    /// Hide existence from outsiders.
    Unauthorized,
    /// The caller is entitled to know the sheet is gone.
    NotFound,
}

/// Loads a player sheet: the caller's own, or an explicit target.
pub struct LoadSheet {
    store: Arc<dyn TransactionalStore>,
    user_id: Option<String>,
    missing: MissingSheet,
}

impl LoadSheet {
    /// Loads the caller's sheet in the current game.
    pub fn caller(store: Arc<dyn TransactionalStore>) -> Self {
        Self {
            store,
            user_id: None,
            missing: MissingSheet::Unauthorized,
        }
    }

    /// Loads the sheet of `user_id`.
    pub fn of(store: Arc<dyn TransactionalStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: Some(user_id.into()),
            missing: MissingSheet::Unauthorized,
        }
    }

    pub fn missing_is_not_found(mut self) -> Self {
        self.missing = MissingSheet::NotFound;
        self
    }
}

#[async_trait]
impl<R: Send + 'static> Stage<R> for LoadSheet {
    fn name(&self) -> &'static str {
        "load-sheet"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        let game_id = ctx.game_id()?.to_owned();
        let user_id = self
            .user_id
            .clone()
            .unwrap_or_else(|| ctx.identity.sub.clone());
        let item = self
            .store
            .get(&ItemKey::player_sheet(&game_id, &user_id))
            .await?
            .ok_or(match self.missing {
                MissingSheet::Unauthorized => CoreError::Unauthorized,
                MissingSheet::NotFound => CoreError::not_found("player sheet"),
            })?;
        ctx.sheet = Some(PlayerSheet::from_item(&item)?);
        Ok(StageOutcome::Continue)
    }
}

/// Requires Owner or Delegate on the loaded sheet.
pub struct RequireSheetAccess;

#[async_trait]
impl<R: Send + 'static> Stage<R> for RequireSheetAccess {
    fn name(&self) -> &'static str {
        "require-sheet-access"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        let role = sheet_role(&ctx.identity, ctx.sheet()?);
        ctx.role = Some(role.require(&[Role::Owner, Role::Delegate])?);
        Ok(StageOutcome::Continue)
    }
}

/// Loads a section of the current game.
pub struct LoadSection {
    store: Arc<dyn TransactionalStore>,
    section_id: String,
}

impl LoadSection {
    pub fn new(store: Arc<dyn TransactionalStore>, section_id: impl Into<String>) -> Self {
        Self {
            store,
            section_id: section_id.into(),
        }
    }
}

#[async_trait]
impl<R: Send + 'static> Stage<R> for LoadSection {
    fn name(&self) -> &'static str {
        "load-section"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        let game_id = ctx.game_id()?.to_owned();
        let item = self
            .store
            .get(&ItemKey::section(&game_id, &self.section_id))
            .await?
            .ok_or_else(|| CoreError::not_found("section"))?;
        ctx.section = Some(Section::from_item(&item)?);
        Ok(StageOutcome::Continue)
    }
}

/// Requires Owner or Delegate on the loaded section, via its
/// denormalized owner kind.
pub struct RequireSectionAccess;

#[async_trait]
impl<R: Send + 'static> Stage<R> for RequireSectionAccess {
    fn name(&self) -> &'static str {
        "require-section-access"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        let gm_user_id = ctx.game()?.gm_user_id.clone();
        let role = section_role(&ctx.identity, ctx.section()?, &gm_user_id);
        ctx.role = Some(role.require(&[Role::Owner, Role::Delegate])?);
        Ok(StageOutcome::Continue)
    }
}

/// Requires a trusted service principal (sweeper, image pipeline).
pub struct RequireService;

#[async_trait]
impl<R: Send + 'static> Stage<R> for RequireService {
    fn name(&self) -> &'static str {
        "require-service"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError> {
        if ctx.identity.is_service() {
            Ok(StageOutcome::Continue)
        } else {
            Err(CoreError::Unauthorized)
        }
    }
}
