//! Engine domain: request context, roles, roll results, join codes.

pub mod context;
pub mod dice_roll;
pub mod join_code;
pub mod roles;

pub use context::RequestContext;
pub use dice_roll::DiceRoll;
pub use roles::{game_role, section_role, sheet_role, Role};
