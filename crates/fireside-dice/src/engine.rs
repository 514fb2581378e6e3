//! Roll resolution and grading.
//!
//! The percentile table is a game-system convention, preserved exactly:
//! a total of 1 is always a critical success, 100 is always a fumble,
//! and matching-digit totals (11, 22, .., 99) grade as critical success
//! or fumble depending on the target. Everything else is a plain
//! success/failure comparison.

use crate::rng::RandomSource;
use crate::types::{DieSpec, Grade, RollOutcome, RollType, RolledDie};

/// Rolls every die and grades the total.
pub fn resolve(
    dice: &[DieSpec],
    roll_type: RollType,
    target: u32,
    rng: &dyn RandomSource,
) -> RollOutcome {
    let rolled: Vec<RolledDie> = dice
        .iter()
        .map(|spec| RolledDie {
            sides: spec.sides,
            value: rng.roll(spec.sides),
        })
        .collect();
    let total: u32 = rolled.iter().map(|d| d.value).sum();
    RollOutcome {
        dice: rolled,
        total,
        roll_type,
        target,
        grade: grade_roll(roll_type, total, target),
    }
}

/// Grades a total. Pure; the only entry point for grading.
pub fn grade_roll(roll_type: RollType, total: u32, target: u32) -> Grade {
    match roll_type {
        RollType::Sum => Grade::Neutral,
        RollType::Percentile => grade_percentile(total, target),
    }
}

fn grade_percentile(total: u32, target: u32) -> Grade {
    if total == 1 {
        return Grade::CriticalSuccess;
    }
    if total == 100 {
        return Grade::Fumble;
    }

    let tens = total / 10;
    let units = total % 10;
    if total >= 11 && tens == units {
        return if total <= target {
            Grade::CriticalSuccess
        } else {
            Grade::Fumble
        };
    }

    if total <= target {
        Grade::Success
    } else {
        Grade::Failure
    }
}
