//! Per-request pipeline context.
//!
//! One mutable record threaded by reference through every stage of a
//! pipeline, and the only channel stages communicate over. Never shared
//! across requests.

use crate::domain::roles::Role;
use shared_types::{Asset, CoreError, Game, Identity, PlayerSheet, Section, Timestamp};

/// Shared scratch state for one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Typed identity, produced once. Never re-derived downstream.
    pub identity: Identity,
    /// Request wall-clock, stamped once so every row in a write set
    /// shares the same `updated_at`.
    pub now: Timestamp,
    pub game_id: Option<String>,
    pub game: Option<Game>,
    pub sheet: Option<PlayerSheet>,
    pub section: Option<Section>,
    pub asset: Option<Asset>,
    /// Role resolved by the most recent gate stage.
    pub role: Option<Role>,
    /// The caller's character name in the current game, when a gate
    /// stage loaded it (used to attribute proxy actions).
    pub actor_name: Option<String>,
}

impl RequestContext {
    pub fn new(identity: Identity, now: Timestamp) -> Self {
        Self {
            identity,
            now,
            game_id: None,
            game: None,
            sheet: None,
            section: None,
            asset: None,
            role: None,
            actor_name: None,
        }
    }

    pub fn for_game(identity: Identity, now: Timestamp, game_id: impl Into<String>) -> Self {
        let mut ctx = Self::new(identity, now);
        ctx.game_id = Some(game_id.into());
        ctx
    }

    /// The loaded game. Absence is a stage-ordering bug, not a user error.
    pub fn game(&self) -> Result<&Game, CoreError> {
        self.game
            .as_ref()
            .ok_or_else(|| CoreError::Internal("game not loaded before use".into()))
    }

    pub fn sheet(&self) -> Result<&PlayerSheet, CoreError> {
        self.sheet
            .as_ref()
            .ok_or_else(|| CoreError::Internal("sheet not loaded before use".into()))
    }

    pub fn section(&self) -> Result<&Section, CoreError> {
        self.section
            .as_ref()
            .ok_or_else(|| CoreError::Internal("section not loaded before use".into()))
    }

    pub fn role(&self) -> Result<Role, CoreError> {
        self.role
            .ok_or_else(|| CoreError::Internal("role not resolved before use".into()))
    }

    pub fn game_id(&self) -> Result<&str, CoreError> {
        self.game_id
            .as_deref()
            .ok_or_else(|| CoreError::Internal("game id missing from context".into()))
    }

    /// True when the caller is the loaded game's host.
    pub fn is_gm(&self) -> bool {
        self.game
            .as_ref()
            .is_some_and(|g| g.gm_user_id == self.identity.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_fail_before_load() {
        let ctx = RequestContext::new(Identity::user("u-1"), 1_000);
        assert!(ctx.game().is_err());
        assert!(ctx.sheet().is_err());
        assert!(ctx.role().is_err());
        assert!(!ctx.is_gm());
    }

    #[test]
    fn test_for_game_seeds_game_id() {
        let ctx = RequestContext::for_game(Identity::user("u-1"), 1_000, "g-1");
        assert_eq!(ctx.game_id().unwrap(), "g-1");
    }
}
