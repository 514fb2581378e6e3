//! Access-control roles.
//!
//! One resolution function per entity level. The resolved role is
//! written into the pipeline context and reused; it is never re-derived
//! downstream, and the matching ownership attribute is re-asserted as a
//! store precondition at write time.

use shared_types::{CoreError, Game, Identity, PlayerSheet, Section, SheetKind};

/// Permission decision for one caller against one loaded entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The entity is the caller's own.
    Owner,
    /// The caller belongs to the surrounding game.
    Member,
    /// The caller may act for the entity without owning it
    /// (the GM acting for an NPC).
    Delegate,
    /// No access.
    Denied,
}

impl Role {
    /// Errors with `Unauthorized` unless the role is one of `allowed`.
    pub fn require(self, allowed: &[Role]) -> Result<Role, CoreError> {
        if allowed.contains(&self) {
            Ok(self)
        } else {
            Err(CoreError::Unauthorized)
        }
    }

    pub fn is_denied(self) -> bool {
        self == Role::Denied
    }
}

/// Game-level: host → Owner, listed player → Member, else Denied.
pub fn game_role(identity: &Identity, game: &Game) -> Role {
    if identity.sub == game.gm_user_id {
        Role::Owner
    } else if game.players.contains(&identity.sub) {
        Role::Member
    } else {
        Role::Denied
    }
}

/// Sheet-level: the sheet's user → Owner; the GM acting on an NPC
/// sheet → Delegate; else Denied.
pub fn sheet_role(identity: &Identity, sheet: &PlayerSheet) -> Role {
    if identity.sub == sheet.user_id {
        Role::Owner
    } else if identity.sub == sheet.gm_user_id && sheet.kind == SheetKind::Npc {
        Role::Delegate
    } else {
        Role::Denied
    }
}

/// Section-level: mirrors the sheet rule through the section's
/// denormalized owner kind, so no extra sheet read is needed.
pub fn section_role(identity: &Identity, section: &Section, gm_user_id: &str) -> Role {
    if identity.sub == section.user_id {
        Role::Owner
    } else if identity.sub == gm_user_id && section.player_type == SheetKind::Npc {
        Role::Delegate
    } else {
        Role::Denied
    }
}
