//! Dice rolling, including proxy rolls for NPCs.

use crate::domain::{sheet_role, DiceRoll, RequestContext, Role};
use crate::operations::SessionService;
use crate::pipeline::{Pipeline, Stage, StageOutcome};
use async_trait::async_trait;
use fireside_dice::{resolve, DieSpec, RandomSource, RollType};
use fireside_store::TransactionalStore;
use serde::{Deserialize, Serialize};
use shared_types::{CoreError, Identity, ItemKey, PlayerSheet};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollDiceInput {
    pub game_id: String,
    pub dice: Vec<DieSpec>,
    pub roll_type: RollType,
    /// Percentile target; ignored for SUM rolls.
    pub target: u32,
    /// Sheet to roll for; defaults to the caller's own.
    pub on_behalf_of: Option<String>,
}

impl SessionService {
    /// Resolves a roll. The result is delivered to subscribers, never
    /// stored. Rolling for another sheet requires the same
    /// Owner/Delegate decision as any sheet mutation and is tagged as a
    /// proxy roll rather than substituting identity.
    pub async fn roll_dice(
        &self,
        identity: &Identity,
        input: RollDiceInput,
    ) -> Result<DiceRoll, CoreError> {
        let mut ctx = RequestContext::for_game(identity.clone(), self.clock.now(), &input.game_id);
        Pipeline::new("roll-dice")
            .stage(ResolveRoller {
                store: Arc::clone(&self.store),
                on_behalf_of: input.on_behalf_of.clone(),
            })
            .stage(RollDiceStage {
                rng: Arc::clone(&self.rng),
                input,
            })
            .execute(&mut ctx)
            .await
    }
}

/// Loads the caller's sheet (proving membership) and, for a proxy roll,
/// the target sheet; resolves the delegate decision. Rolling for
/// oneself short-circuits the second lookup.
struct ResolveRoller {
    store: Arc<dyn TransactionalStore>,
    on_behalf_of: Option<String>,
}

#[async_trait]
impl Stage<DiceRoll> for ResolveRoller {
    fn name(&self) -> &'static str {
        "resolve-roller"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<DiceRoll>, CoreError> {
        let game_id = ctx.game_id()?.to_owned();
        let caller_key = ItemKey::player_sheet(&game_id, &ctx.identity.sub);

        let target_user = self
            .on_behalf_of
            .clone()
            .filter(|target| *target != ctx.identity.sub);

        let mut keys = vec![caller_key];
        if let Some(target) = &target_user {
            keys.push(ItemKey::player_sheet(&game_id, target));
        }
        let mut items = self.store.batch_get(&keys).await?.into_iter();

        // Without a sheet in this game the caller has no standing; the
        // game's existence is not revealed.
        let caller_item = items.next().flatten().ok_or(CoreError::Unauthorized)?;
        let caller = PlayerSheet::from_item(&caller_item)?;

        ctx.actor_name = Some(caller.character_name.clone());
        match target_user {
            None => {
                ctx.role = Some(Role::Owner);
                ctx.sheet = Some(caller);
            }
            Some(_) => {
                let target_item = items.next().flatten().ok_or(CoreError::Unauthorized)?;
                let target = PlayerSheet::from_item(&target_item)?;
                let role = sheet_role(&ctx.identity, &target);
                ctx.role = Some(role.require(&[Role::Owner, Role::Delegate])?);
                ctx.sheet = Some(target);
            }
        }
        Ok(StageOutcome::Continue)
    }
}

struct RollDiceStage {
    rng: Arc<dyn RandomSource>,
    input: RollDiceInput,
}

#[async_trait]
impl Stage<DiceRoll> for RollDiceStage {
    fn name(&self) -> &'static str {
        "roll-dice"
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<DiceRoll>, CoreError> {
        if self.input.dice.is_empty() {
            return Err(CoreError::validation("at least one die is required"));
        }
        if self.input.dice.iter().any(|d| d.sides == 0) {
            return Err(CoreError::validation("dice must have at least one side"));
        }

        let sheet = ctx.sheet()?;
        let proxy_roll = ctx.role()? == Role::Delegate;
        let outcome = resolve(
            &self.input.dice,
            self.input.roll_type,
            self.input.target,
            self.rng.as_ref(),
        );

        let roll = DiceRoll {
            game_id: self.input.game_id.clone(),
            player_id: sheet.user_id.clone(),
            player_name: sheet.character_name.clone(),
            dice: outcome.dice,
            total: outcome.total,
            roll_type: outcome.roll_type,
            target: outcome.target,
            grade: outcome.grade,
            rolled_at: ctx.now,
            rolled_by: ctx
                .actor_name
                .clone()
                .unwrap_or_else(|| sheet.character_name.clone()),
            proxy_roll,
            message_index: self.rng.roll(10_000) - 1,
        };

        info!(
            game_id = %roll.game_id,
            player_id = %roll.player_id,
            total = roll.total,
            grade = ?roll.grade,
            proxy = roll.proxy_roll,
            "dice rolled"
        );
        Ok(StageOutcome::Done(roll))
    }
}
