//! Write-set domain model: conditions, update actions, operations.

pub mod condition;
pub mod update;
pub mod write_set;

pub use condition::Condition;
pub use update::UpdateAction;
pub use write_set::{WriteOp, WriteSet};
