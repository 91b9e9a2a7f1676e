//! Properties of the grading rules across many scores and lines.

use pickem::{GameLine, GameOutcome, GameStatus, PickResult, Selection, Winner, grade};

fn line(home: Option<i32>, away: Option<i32>, spread: Option<f64>, total: Option<f64>) -> GameLine {
    GameLine {
        home_team: "Buffalo Bills".to_string(),
        away_team: "Miami Dolphins".to_string(),
        home_score: home,
        away_score: away,
        spread,
        over_under: total,
        status: GameStatus::Final,
    }
}

fn opposite(result: PickResult) -> PickResult {
    match result {
        PickResult::Correct => PickResult::Incorrect,
        PickResult::Incorrect => PickResult::Correct,
        other => other,
    }
}

const SPREADS: [f64; 7] = [-10.5, -7.0, -3.0, 0.0, 2.5, 3.0, 6.5];
const TOTALS: [f64; 4] = [37.0, 41.5, 44.0, 51.5];

#[test]
fn sides_are_mirror_images() {
    for home in (0..=42).step_by(3) {
        for away in (0..=42).step_by(4) {
            for spread in SPREADS {
                let game = line(Some(home), Some(away), Some(spread), None);
                let home_pick = grade(&game, Selection::Home);
                let away_pick = grade(&game, Selection::Away);
                assert_ne!(PickResult::Pending, home_pick);
                assert_eq!(
                    opposite(home_pick),
                    away_pick,
                    "{}-{} with spread {}",
                    home,
                    away,
                    spread
                );
            }
        }
    }
}

#[test]
fn totals_are_mirror_images() {
    for home in (0..=35).step_by(5) {
        for away in (0..=35).step_by(7) {
            for total in TOTALS {
                let game = line(Some(home), Some(away), None, Some(total));
                let over = grade(&game, Selection::Over);
                let under = grade(&game, Selection::Under);
                assert_eq!(opposite(over), under, "{}-{} against {}", home, away, total);
                let push = f64::from(home + away) == total;
                assert_eq!(push, over == PickResult::Tie);
            }
        }
    }
}

#[test]
fn exact_spread_is_a_push_for_both_sides() {
    // Home favored by 3, wins by 3.
    let game = line(Some(24), Some(21), Some(-3.0), None);
    assert_eq!(PickResult::Tie, grade(&game, Selection::Home));
    assert_eq!(PickResult::Tie, grade(&game, Selection::Away));
}

#[test]
fn missing_scores_or_unfinished_games_stay_pending() {
    let every = [
        Selection::Home,
        Selection::Away,
        Selection::Over,
        Selection::Under,
    ];
    let missing_home = line(None, Some(17), Some(-3.0), Some(44.0));
    let missing_away = line(Some(17), None, Some(-3.0), Some(44.0));
    let mut in_progress = line(Some(28), Some(3), Some(-3.0), Some(44.0));
    in_progress.status = GameStatus::InProgress;

    for game in [&missing_home, &missing_away, &in_progress] {
        for selection in every {
            assert_eq!(PickResult::Pending, grade(game, selection));
        }
        assert_eq!(GameOutcome::Pending, game.outcome());
    }
}

#[test]
fn outcome_reports_straight_up_winner() {
    let game = line(Some(20), Some(27), Some(-6.5), Some(44.0));
    match game.outcome() {
        GameOutcome::Final { winner, score, .. } => {
            assert_eq!(Winner::Away, winner);
            assert_eq!("Miami Dolphins 27 @ Buffalo Bills 20", score);
        }
        GameOutcome::Pending => panic!("final game reported pending"),
    }
    assert_eq!(
        Selection::Away,
        Selection::resolve("MIAMI DOLPHINS", "Buffalo Bills", "Miami Dolphins")
            .expect("team name resolves")
    );
}
