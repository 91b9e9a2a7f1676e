//! Domain types for grading picks.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::instrument;

/// Lifecycle of an NFL game as tracked by the pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Not yet kicked off.
    #[default]
    Scheduled,
    /// Kicked off, not final.
    InProgress,
    /// Final score recorded.
    Final,
}

/// What a pick is on: one side of the spread, or one side of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Selection {
    /// Home team against the spread.
    Home,
    /// Away team against the spread.
    Away,
    /// Combined score above the total.
    Over,
    /// Combined score below the total.
    Under,
}

/// A submitted pick could not be mapped onto either team or the total.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SelectionError {
    /// The pick named neither team in the game.
    #[display("'{}' is not a team in {} @ {}", pick, away_team, home_team)]
    UnknownTeam {
        /// The raw pick text.
        pick: String,
        /// Home team of the game.
        home_team: String,
        /// Away team of the game.
        away_team: String,
    },
    /// The pick was blank.
    #[display("Pick is empty")]
    Empty,
}

impl std::error::Error for SelectionError {}

impl Selection {
    /// Resolves a raw submitted pick against a game's teams.
    ///
    /// Accepts `home`, `away`, `over`, `under`, or either team's name
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] if the pick matches nothing in the game.
    #[instrument]
    pub fn resolve(raw: &str, home_team: &str, away_team: &str) -> Result<Self, SelectionError> {
        let pick = raw.trim();
        if pick.is_empty() {
            return Err(SelectionError::Empty);
        }
        if let Ok(selection) = pick.to_ascii_lowercase().parse::<Self>() {
            return Ok(selection);
        }
        if pick.eq_ignore_ascii_case(home_team.trim()) {
            Ok(Self::Home)
        } else if pick.eq_ignore_ascii_case(away_team.trim()) {
            Ok(Self::Away)
        } else {
            Err(SelectionError::UnknownTeam {
                pick: pick.to_string(),
                home_team: home_team.to_string(),
                away_team: away_team.to_string(),
            })
        }
    }

    /// Renders the selection for display: the team name for spread picks,
    /// `over`/`under` for totals.
    pub fn label<'a>(&self, home_team: &'a str, away_team: &'a str) -> &'a str {
        match self {
            Self::Home => home_team,
            Self::Away => away_team,
            Self::Over => "over",
            Self::Under => "under",
        }
    }

    /// Returns true for spread picks.
    pub fn is_side(&self) -> bool {
        matches!(self, Self::Home | Self::Away)
    }
}

/// Grade of a single pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PickResult {
    /// The pick covered.
    Correct,
    /// The pick did not cover.
    Incorrect,
    /// Push: the result landed exactly on the line.
    Tie,
    /// The game is not final yet, or the line is missing.
    Pending,
}

/// The numbers a pick is graded against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameLine {
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Home team score, once known.
    pub home_score: Option<i32>,
    /// Away team score, once known.
    pub away_score: Option<i32>,
    /// Home team's spread; negative when the home team is favored.
    pub spread: Option<f64>,
    /// Combined-score total.
    pub over_under: Option<f64>,
    /// Game status.
    pub status: GameStatus,
}

impl GameLine {
    /// Final scores as `(home, away)`, or `None` if the game is not final
    /// or either score is missing.
    pub fn final_scores(&self) -> Option<(i32, i32)> {
        if self.status != GameStatus::Final {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }

    /// Summarises the game's final result.
    pub fn outcome(&self) -> GameOutcome {
        match self.final_scores() {
            None => GameOutcome::Pending,
            Some((home_score, away_score)) => {
                let winner = match home_score.cmp(&away_score) {
                    std::cmp::Ordering::Greater => Winner::Home,
                    std::cmp::Ordering::Less => Winner::Away,
                    std::cmp::Ordering::Equal => Winner::Tie,
                };
                GameOutcome::Final {
                    winner,
                    score: format!(
                        "{} {} @ {} {}",
                        self.away_team, away_score, self.home_team, home_score
                    ),
                    home_score,
                    away_score,
                }
            }
        }
    }
}

/// Straight-up winner of a final game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// Home team won.
    Home,
    /// Away team won.
    Away,
    /// Game ended level.
    Tie,
}

/// Final result of a game, straight up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GameOutcome {
    /// No final score yet.
    Pending,
    /// Final score recorded.
    Final {
        /// Straight-up winner.
        winner: Winner,
        /// Display line, e.g. `Dallas Cowboys 30 @ Philadelphia Eagles 34`.
        score: String,
        /// Home team score.
        home_score: i32,
        /// Away team score.
        away_score: i32,
    },
}
