//! # Fireside Store
//!
//! The transactional mutation engine. Every mutation in the system is
//! expressed as a [`domain::WriteSet`], an ordered list of Put/Update/
//! Delete operations, each with an optional precondition, and submitted
//! through the [`ports::TransactionalStore`] port as a single atomic
//! call: either every operation applies or none does, and no reader
//! observes an intermediate state.
//!
//! Preconditions double as authorization checks (ownership attributes)
//! and quota checks (counter comparisons); there is no lock manager and
//! no read-then-check anywhere above this crate.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod retry;

pub use adapters::memory::MemoryStore;
pub use domain::{Condition, UpdateAction, WriteOp, WriteSet};
pub use ports::TransactionalStore;
pub use retry::RetryPolicy;
