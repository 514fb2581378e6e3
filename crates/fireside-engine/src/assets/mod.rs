//! Asset lifecycle state machine.

pub mod lifecycle;

pub use lifecycle::{delete_condition, AssetTransition, DELETABLE_STATUSES};
