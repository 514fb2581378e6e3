//! The grading table, end to end through the service.

#![cfg(test)]

use fireside_dice::{grade_roll, DieSpec, Grade, RollType};
use fireside_engine::operations::dice::RollDiceInput;
use fireside_engine::testkit::harness;
use shared_types::Identity;

#[test]
fn test_full_percentile_grading_table() {
    // Sweep every total and a spread of targets against the rules:
    // 1 always crits, 100 always fumbles, doubles grade against the
    // target, everything else is a plain comparison.
    for target in [0, 1, 25, 50, 99, 100] {
        for total in 1..=100u32 {
            let grade = grade_roll(RollType::Percentile, total, target);
            let expected = if total == 1 {
                Grade::CriticalSuccess
            } else if total == 100 {
                Grade::Fumble
            } else if total >= 11 && total / 10 == total % 10 {
                if total <= target {
                    Grade::CriticalSuccess
                } else {
                    Grade::Fumble
                }
            } else if total <= target {
                Grade::Success
            } else {
                Grade::Failure
            };
            assert_eq!(grade, expected, "total={total} target={target}");
        }
    }
}

#[test]
fn test_sum_never_consults_target() {
    for total in 1..=100u32 {
        assert_eq!(grade_roll(RollType::Sum, total, 0), Grade::Neutral);
        assert_eq!(grade_roll(RollType::Sum, total, 200), Grade::Neutral);
    }
}

#[tokio::test]
async fn test_service_rolls_stay_in_range_and_grade_consistently() {
    crate::init_tracing();
    let h = harness();
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    for _ in 0..200 {
        let roll = h
            .service
            .roll_dice(
                &gm,
                RollDiceInput {
                    game_id: game.game_id.clone(),
                    dice: vec![DieSpec::d100()],
                    roll_type: RollType::Percentile,
                    target: 50,
                    on_behalf_of: None,
                },
            )
            .await
            .unwrap();
        assert!((1..=100).contains(&roll.total));
        // The service's grade always matches the pure function.
        assert_eq!(
            roll.grade,
            grade_roll(RollType::Percentile, roll.total, 50)
        );
    }
}

#[tokio::test]
async fn test_multi_die_sum_bounds() {
    let h = harness();
    let gm = Identity::user("gm-1");
    let game = h.create_default_game(&gm).await;

    for _ in 0..100 {
        let roll = h
            .service
            .roll_dice(
                &gm,
                RollDiceInput {
                    game_id: game.game_id.clone(),
                    dice: vec![DieSpec::new(6); 3],
                    roll_type: RollType::Sum,
                    target: 0,
                    on_behalf_of: None,
                },
            )
            .await
            .unwrap();
        assert!((3..=18).contains(&roll.total));
        assert_eq!(roll.grade, Grade::Neutral);
        assert_eq!(roll.dice.len(), 3);
        let sum: u32 = roll.dice.iter().map(|d| d.value).sum();
        assert_eq!(sum, roll.total);
    }
}
