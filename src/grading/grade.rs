//! The grading decision table.

use super::{GameLine, PickResult, Selection};
use tracing::instrument;

/// Grades a pick against a game.
///
/// The spread is the home team's line: negative when home is favored.
/// The home side covers when `margin + spread > 0`, the away side when it
/// is below zero, and exactly zero is a push for both. A missing spread
/// grades as a pick'em. Totals compare the combined score to the line;
/// a missing total leaves over/under picks pending.
#[instrument(skip(line), fields(home = %line.home_team, away = %line.away_team))]
pub fn grade(line: &GameLine, selection: Selection) -> PickResult {
    let Some((home_score, away_score)) = line.final_scores() else {
        return PickResult::Pending;
    };

    match selection {
        Selection::Home | Selection::Away => {
            let margin = f64::from(home_score) - f64::from(away_score);
            let adjusted = margin + line.spread.unwrap_or(0.0);
            // Positive favors the home side, negative the away side.
            let toward_pick = match selection {
                Selection::Home => adjusted,
                _ => -adjusted,
            };
            classify(toward_pick)
        }
        Selection::Over | Selection::Under => {
            let Some(total_line) = line.over_under else {
                return PickResult::Pending;
            };
            let total = f64::from(home_score) + f64::from(away_score);
            let over_by = total - total_line;
            let toward_pick = match selection {
                Selection::Over => over_by,
                _ => -over_by,
            };
            classify(toward_pick)
        }
    }
}

fn classify(toward_pick: f64) -> PickResult {
    if toward_pick > 0.0 {
        PickResult::Correct
    } else if toward_pick < 0.0 {
        PickResult::Incorrect
    } else {
        PickResult::Tie
    }
}
