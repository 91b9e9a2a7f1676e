//! Game slates and results.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

use super::ServiceError;
use crate::db::{Game, GameResultUpdate, NewGame, PoolRepository};
use crate::grading::GameStatus;
use crate::schedule::{NflWeek, REGULAR_SEASON_WEEKS};

/// One game of a slate, as ingested from an odds or schedule feed.
#[derive(Debug, Clone, Deserialize)]
pub struct GameInput {
    /// Feed identifier; re-ingesting the same id refreshes the game.
    pub external_id: String,
    /// Week number.
    pub week: i32,
    /// Season year.
    pub season: i32,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Home team's spread; negative when the home team is favored.
    #[serde(default)]
    pub spread: Option<f64>,
    /// Combined-score total.
    #[serde(default)]
    pub over_under: Option<f64>,
    /// Kickoff.
    pub game_time: DateTime<Utc>,
    /// Status; new games default to scheduled, known games keep theirs.
    #[serde(default)]
    pub status: Option<GameStatus>,
}

/// A score report for one game.
#[derive(Debug, Clone, Deserialize)]
pub struct GameResultInput {
    /// Home team score.
    pub home_score: Option<i32>,
    /// Away team score.
    pub away_score: Option<i32>,
    /// New status.
    pub status: GameStatus,
}

/// Game slate operations.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: PoolRepository,
}

impl GameService {
    /// Creates a game service.
    #[instrument(skip(repository))]
    pub fn new(repository: PoolRepository) -> Self {
        info!("Creating GameService");
        Self { repository }
    }

    /// A week's games in kickoff order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] on a database failure.
    #[instrument(skip(self), fields(week = %week))]
    pub fn games_for_week(&self, week: NflWeek) -> Result<Vec<Game>, ServiceError> {
        Ok(self.repository.games_for_week(week)?)
    }

    /// Inserts or refreshes a slate. Lines and kickoff are updated in place;
    /// scores are left alone, as is the status unless the slate gives one.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for an empty slate or a malformed game.
    #[instrument(skip(self, games), fields(count = games.len()))]
    pub fn ingest_slate(&self, games: Vec<GameInput>) -> Result<Vec<Game>, ServiceError> {
        if games.is_empty() {
            return Err(ServiceError::validation("No games provided"));
        }

        let rows = games
            .into_iter()
            .map(|game| {
                let home = game.home_team.trim();
                let away = game.away_team.trim();
                if game.external_id.trim().is_empty() || home.is_empty() || away.is_empty() {
                    return Err(ServiceError::validation(
                        "Games need an external id and both teams",
                    ));
                }
                if home.eq_ignore_ascii_case(away) {
                    return Err(ServiceError::validation(format!(
                        "Game {} has the same team on both sides",
                        game.external_id
                    )));
                }
                if !(1..=REGULAR_SEASON_WEEKS).contains(&game.week) {
                    return Err(ServiceError::validation(format!(
                        "Week must be between 1 and {}",
                        REGULAR_SEASON_WEEKS
                    )));
                }
                Ok(NewGame::new(
                    game.external_id.trim().to_string(),
                    game.week,
                    game.season,
                    home.to_string(),
                    away.to_string(),
                    game.spread,
                    game.over_under,
                    game.game_time.naive_utc(),
                    game.status.map(|status| status.to_string()),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.repository.upsert_games(rows)?)
    }

    /// Records a score report.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] for negative scores, or a final status
    ///   without both scores
    /// - [`ServiceError::NotFound`] if the game does not exist
    #[instrument(skip(self, input), fields(status = %input.status))]
    pub fn record_result(
        &self,
        game_id: i32,
        input: GameResultInput,
    ) -> Result<Game, ServiceError> {
        if input.home_score.is_some_and(|s| s < 0) || input.away_score.is_some_and(|s| s < 0) {
            return Err(ServiceError::validation("Scores cannot be negative"));
        }
        if input.status == GameStatus::Final
            && (input.home_score.is_none() || input.away_score.is_none())
        {
            return Err(ServiceError::validation(
                "A final game needs both scores",
            ));
        }

        let update = GameResultUpdate::new(
            input.home_score,
            input.away_score,
            input.status.to_string(),
            Utc::now().naive_utc(),
        );
        self.repository
            .record_result(game_id, update)
            .map_err(|e| {
                if e.is_not_found() {
                    ServiceError::not_found("Game not found")
                } else {
                    e.into()
                }
            })
    }
}
