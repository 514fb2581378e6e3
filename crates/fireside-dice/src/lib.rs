//! # Fireside Dice
//!
//! The dice-resolution engine: rolls are uniform in `[1, sides]`, the
//! grade is a pure function of the total, the roll type, and the
//! target. Randomness enters only through the [`rng::RandomSource`]
//! port, so every grading path is exactly reproducible in tests.

pub mod engine;
pub mod rng;
pub mod types;

pub use engine::{grade_roll, resolve};
pub use rng::{FixedSource, RandomSource, SeededSource, ThreadRngSource};
pub use types::{DieSpec, Grade, RollOutcome, RollType, RolledDie};
