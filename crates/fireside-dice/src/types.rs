//! Roll inputs and outcomes.

use serde::{Deserialize, Serialize};

/// One requested die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieSpec {
    /// Face count; rolls land in `[1, sides]`.
    pub sides: u32,
}

impl DieSpec {
    pub fn new(sides: u32) -> Self {
        Self { sides }
    }

    /// Conventional percentile die.
    pub fn d100() -> Self {
        Self { sides: 100 }
    }
}

/// How the total is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollType {
    /// Plain sum; no grading against a target.
    Sum,
    /// Percentile check against a target, with the doubles rule.
    Percentile,
}

/// Qualitative outcome of a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    CriticalSuccess,
    Success,
    Failure,
    Fumble,
    Neutral,
}

/// One die after rolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledDie {
    pub sides: u32,
    pub value: u32,
}

/// A fully resolved roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub dice: Vec<RolledDie>,
    pub total: u32,
    pub roll_type: RollType,
    pub target: u32,
    pub grade: Grade,
}
