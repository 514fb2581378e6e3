//! Pipeline executor and the shared gate stages.

pub mod executor;
pub mod stages;

pub use executor::{Pipeline, Stage, StageOutcome};
