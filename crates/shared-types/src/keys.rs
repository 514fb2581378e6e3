//! Single-table key derivation.
//!
//! Every entity lives in one logical table under a composite
//! `(pk, sk)` key. Secondary lookups (a user's games, a join code)
//! go through one derived index attribute, `gsi1`, whose value is
//! always computed from the row's current attributes; rewriting the
//! attribute atomically retargets the index entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition prefix for game-scoped rows.
pub const PREFIX_GAME: &str = "GAME";
/// Sort prefix for player-sheet rows.
pub const PREFIX_PLAYER: &str = "PLAYER";
/// Sort prefix for section rows.
pub const PREFIX_SECTION: &str = "SECTION";
/// Sort prefix for asset rows.
pub const PREFIX_ASSET: &str = "ASSET";
/// Index prefix mapping a user to their sheets across games.
pub const PREFIX_USER: &str = "USER";
/// Index prefix mapping a join code to its game.
pub const PREFIX_JOIN: &str = "JOIN";
/// Index prefix mapping a user to the sections they own.
pub const PREFIX_SECTION_USER: &str = "SECTIONUSER";
/// Key of the singleton system-notification row.
pub const KEY_NOTIFICATION: &str = "NOTIFICATION";
/// Partition prefix for per-game-type defaults rows.
pub const PREFIX_DEFAULTS: &str = "DEFAULTS";

/// Name of the derived secondary-index attribute.
pub const INDEX_ATTR: &str = "gsi1";

/// Composite primary key of one item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Key of the Game row for `game_id`.
    pub fn game(game_id: &str) -> Self {
        Self::new(format!("{PREFIX_GAME}#{game_id}"), PREFIX_GAME)
    }

    /// Key of the PlayerSheet row for `(game_id, user_id)`.
    pub fn player_sheet(game_id: &str, user_id: &str) -> Self {
        Self::new(
            format!("{PREFIX_GAME}#{game_id}"),
            format!("{PREFIX_PLAYER}#{user_id}"),
        )
    }

    /// Key of the Section row for `(game_id, section_id)`.
    pub fn section(game_id: &str, section_id: &str) -> Self {
        Self::new(
            format!("{PREFIX_GAME}#{game_id}"),
            format!("{PREFIX_SECTION}#{section_id}"),
        )
    }

    /// Key of the Asset row for `(game_id, asset_id)`.
    pub fn asset(game_id: &str, asset_id: &str) -> Self {
        Self::new(
            format!("{PREFIX_GAME}#{game_id}"),
            format!("{PREFIX_ASSET}#{asset_id}"),
        )
    }

    /// Key of the singleton system-notification row.
    pub fn system_notification() -> Self {
        Self::new(KEY_NOTIFICATION, KEY_NOTIFICATION)
    }

    /// Key of the defaults row for a game type.
    pub fn game_defaults(game_type: &str) -> Self {
        Self::new(format!("{PREFIX_DEFAULTS}#{game_type}"), PREFIX_DEFAULTS)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

/// Index value pointing a user at one of their sheets.
pub fn user_index_value(user_id: &str) -> String {
    format!("{PREFIX_USER}#{user_id}")
}

/// Index value pointing a join code at its game.
pub fn join_index_value(join_code: &str) -> String {
    format!("{PREFIX_JOIN}#{join_code}")
}

/// Index value pointing a user at one of their sections.
pub fn section_user_index_value(user_id: &str) -> String {
    format!("{PREFIX_SECTION_USER}#{user_id}")
}

/// Sort-key prefix selecting every player sheet of a game.
pub fn player_sk_prefix() -> String {
    format!("{PREFIX_PLAYER}#")
}

/// Sort-key prefix selecting every section of a game.
pub fn section_sk_prefix() -> String {
    format!("{PREFIX_SECTION}#")
}
