//! Resolved roll result, as delivered to subscribers.
//!
//! Rolls are not stored; the result exists only on the wire. A proxy
//! roll keeps both names: `player_name` is the sheet rolled for,
//! `rolled_by` the controlling actor; identity is never substituted.

use fireside_dice::{Grade, RollType, RolledDie};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub game_id: String,
    /// The sheet the roll belongs to (the NPC on a proxy roll).
    pub player_id: String,
    pub player_name: String,
    pub dice: Vec<RolledDie>,
    pub total: u32,
    pub roll_type: RollType,
    pub target: u32,
    pub grade: Grade,
    pub rolled_at: Timestamp,
    /// Character name of the actor who physically rolled.
    pub rolled_by: String,
    pub proxy_roll: bool,
    /// Random index for client-side result-text variation.
    pub message_index: u32,
}
