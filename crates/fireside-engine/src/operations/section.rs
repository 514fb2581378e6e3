//! Section operations: create (quota-consuming), update, delete
//! (quota-restoring).

use crate::domain::{RequestContext, Role};
use crate::operations::{map_canceled, SessionService};
use crate::pipeline::stages::{
    LoadGame, LoadSection, LoadSheet, RequireGameMember, RequireSectionAccess, RequireSheetAccess,
};
use crate::pipeline::{Pipeline, Stage, StageOutcome};
use async_trait::async_trait;
use fireside_store::{Condition, TransactionalStore, UpdateAction, WriteOp, WriteSet};
use serde::{Deserialize, Serialize};
use shared_types::{new_id, AttrValue, CoreError, Identity, ItemKey, Section, SheetKind};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSectionInput {
    pub game_id: String,
    /// Owner sheet; the caller when creating on their own sheet, an NPC
    /// id when the GM creates for an NPC.
    pub user_id: String,
    pub section_name: String,
    pub section_type: String,
    pub content: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSectionInput {
    pub game_id: String,
    pub section_id: String,
    pub section_name: Option<String>,
    pub content: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSectionInput {
    pub game_id: String,
    pub section_id: String,
}

impl SessionService {
    /// Creates a section, consuming one unit of the owner sheet's
    /// section quota. Under arbitrary concurrency exactly
    /// `remaining_sections` creates succeed; the rest fail with
    /// `QuotaExceeded` and create nothing.
    pub async fn create_section(
        &self,
        identity: &Identity,
        input: CreateSectionInput,
    ) -> Result<Section, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("create-section")
            .stage(LoadSheet::of(Arc::clone(&self.store), &input.user_id))
            .stage(RequireSheetAccess)
            .stage(CreateSectionStage {
                store: Arc::clone(&self.store),
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Updates a section's name, content, or position.
    pub async fn update_section(
        &self,
        identity: &Identity,
        input: UpdateSectionInput,
    ) -> Result<Section, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("update-section")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameMember)
            .stage(LoadSection::new(Arc::clone(&self.store), &input.section_id))
            .stage(RequireSectionAccess)
            .stage(UpdateSectionStage {
                store: Arc::clone(&self.store),
                input,
            })
            .execute(&mut ctx)
            .await
    }

    /// Deletes a section and restores one unit of the owner sheet's
    /// quota in the same write set.
    pub async fn delete_section(
        &self,
        identity: &Identity,
        input: DeleteSectionInput,
    ) -> Result<Section, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("delete-section")
            .stage(LoadGame::new(Arc::clone(&self.store)))
            .stage(RequireGameMember)
            .stage(LoadSection::new(Arc::clone(&self.store), &input.section_id))
            .stage(RequireSectionAccess)
            .stage(DeleteSectionStage {
                store: Arc::clone(&self.store),
            })
            .execute(&mut ctx)
            .await
    }
}

struct CreateSectionStage {
    store: Arc<dyn TransactionalStore>,
    input: CreateSectionInput,
}

#[async_trait]
impl Stage<Section> for CreateSectionStage {
    fn name(&self) -> &'static str {
        "create-section"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<Section>, CoreError> {
        let sheet = ctx.sheet()?;
        let section = Section {
            game_id: self.input.game_id.clone(),
            section_id: new_id(),
            user_id: sheet.user_id.clone(),
            section_name: self.input.section_name.clone(),
            section_type: self.input.section_type.clone(),
            position: self.input.position,
            content: self.input.content.clone(),
            player_type: sheet.kind,
            assets: Vec::new(),
            created_at: ctx.now,
            updated_at: ctx.now,
        };

        // The quota precondition is the whole enforcement: no
        // read-then-check, the decrement and the put commit together.
        let writes = WriteSet::new()
            .with(WriteOp::update_if(
                sheet.key(),
                vec![
                    UpdateAction::Add("remaining_sections".into(), -1),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(ctx.now as i64)),
                ],
                Condition::positive("remaining_sections"),
            ))
            .with(WriteOp::put(section.key(), section.to_item()));

        self.store.transact_write(writes).await.map_err(|e| {
            map_canceled(
                e,
                &[
                    CoreError::QuotaExceeded {
                        resource: "sections",
                    },
                    CoreError::Internal("section id collision".into()),
                ],
            )
        })?;

        info!(
            game_id = %section.game_id,
            section_id = %section.section_id,
            section_type = %section.section_type,
            "section created"
        );
        Ok(StageOutcome::Done(section))
    }
}

struct UpdateSectionStage {
    store: Arc<dyn TransactionalStore>,
    input: UpdateSectionInput,
}

#[async_trait]
impl Stage<Section> for UpdateSectionStage {
    fn name(&self) -> &'static str {
        "update-section"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<Section>, CoreError> {
        let section = ctx.section()?;
        let mut actions = vec![UpdateAction::Set(
            "updated_at".into(),
            AttrValue::N(ctx.now as i64),
        )];
        if let Some(name) = &self.input.section_name {
            actions.push(UpdateAction::Set(
                "section_name".into(),
                AttrValue::s(name),
            ));
        }
        if let Some(content) = &self.input.content {
            actions.push(UpdateAction::Set("content".into(), AttrValue::s(content)));
        }
        if let Some(position) = self.input.position {
            actions.push(UpdateAction::Set("position".into(), AttrValue::N(position)));
        }

        let updated = self
            .store
            .update_item(
                &section.key(),
                actions,
                Some(ownership_condition(ctx.role()?, &ctx.identity.sub)),
            )
            .await
            .map_err(|err| match err {
                shared_types::StoreError::ConditionFailed { .. } => {
                    CoreError::ConflictOwnership.public()
                }
                other => CoreError::Store(other),
            })?;
        Ok(StageOutcome::Done(Section::from_item(&updated)?))
    }
}

struct DeleteSectionStage {
    store: Arc<dyn TransactionalStore>,
}

#[async_trait]
impl Stage<Section> for DeleteSectionStage {
    fn name(&self) -> &'static str {
        "delete-section"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<Section>, CoreError> {
        let section = ctx.section()?.clone();
        let sheet_key = ItemKey::player_sheet(&section.game_id, &section.user_id);

        let writes = WriteSet::new()
            .with(WriteOp::update(
                sheet_key,
                vec![
                    UpdateAction::Add("remaining_sections".into(), 1),
                    UpdateAction::Set("updated_at".into(), AttrValue::N(ctx.now as i64)),
                ],
            ))
            .with(WriteOp::delete_if(
                section.key(),
                ownership_condition(ctx.role()?, &ctx.identity.sub),
            ));

        self.store.transact_write(writes).await.map_err(|e| {
            map_canceled(
                e,
                &[
                    CoreError::Internal("unconditional quota restore failed".into()),
                    CoreError::Unauthorized,
                ],
            )
        })?;

        info!(
            game_id = %section.game_id,
            section_id = %section.section_id,
            "section deleted"
        );
        Ok(StageOutcome::Done(section))
    }
}

/// Write-time re-assertion of the resolved role: owners must still own
/// the row, delegates require the row to still be NPC-owned.
fn ownership_condition(role: Role, sub: &str) -> Condition {
    match role {
        Role::Delegate => Condition::eq_s("player_type", SheetKind::Npc.as_str()),
        _ => Condition::eq_s("user_id", sub),
    }
}
