//! Games and their lines.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::{PoolRepository, week_key};
use crate::db::models::GameInsert;
use crate::db::{DbError, Game, GameResultUpdate, NewGame, schema};
use crate::grading::GameStatus;
use crate::schedule::NflWeek;

impl PoolRepository {
    /// Inserts or refreshes a slate of games, keyed by external id.
    ///
    /// Scores are never touched here; use [`PoolRepository::record_result`].
    /// A refresh without a status keeps the stored one, so a finished game
    /// stays final when its slate is polled again.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; no game is stored.
    #[instrument(skip(self, games), fields(count = games.len()))]
    pub fn upsert_games(&self, games: Vec<NewGame>) -> Result<Vec<Game>, DbError> {
        let mut conn = self.connection()?;
        let now = chrono::Utc::now().naive_utc();

        let stored = conn.transaction::<_, DbError, _>(|conn| {
            games
                .iter()
                .map(|game| {
                    diesel::insert_into(schema::games::table)
                        .values(GameInsert::from(game))
                        .on_conflict(schema::games::external_id)
                        .do_update()
                        .set((game, schema::games::updated_at.eq(now)))
                        .returning(Game::as_returning())
                        .get_result(conn)
                        .map_err(DbError::from)
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        info!(count = stored.len(), "Games stored");
        Ok(stored)
    }

    /// Gets a game by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: i32) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;
        let game = schema::games::table
            .find(game_id)
            .select(Game::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(game)
    }

    /// Loads the given games. Ids with no game are simply absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, game_ids), fields(count = game_ids.len()))]
    pub fn games_by_ids(&self, game_ids: &[i32]) -> Result<Vec<Game>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::id.eq_any(game_ids))
            .select(Game::as_select())
            .load(&mut conn)?;
        Ok(games)
    }

    /// Lists a week's games in kickoff order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self), fields(week = %week))]
    pub fn games_for_week(&self, week: NflWeek) -> Result<Vec<Game>, DbError> {
        let (season, week_no) = week_key(week);
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::season.eq(season))
            .filter(schema::games::week.eq(week_no))
            .order((schema::games::game_time.asc(), schema::games::id.asc()))
            .select(Game::as_select())
            .load(&mut conn)?;
        debug!(count = games.len(), "Week games loaded");
        Ok(games)
    }

    /// Lists a week's games that are final with both scores recorded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self), fields(week = %week))]
    pub fn final_games_for_week(&self, week: NflWeek) -> Result<Vec<Game>, DbError> {
        let (season, week_no) = week_key(week);
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::season.eq(season))
            .filter(schema::games::week.eq(week_no))
            .filter(schema::games::status.eq(GameStatus::Final.to_string()))
            .filter(schema::games::home_score.is_not_null())
            .filter(schema::games::away_score.is_not_null())
            .order((schema::games::game_time.asc(), schema::games::id.asc()))
            .select(Game::as_select())
            .load(&mut conn)?;
        debug!(count = games.len(), "Final games loaded");
        Ok(games)
    }

    /// Records a game's score and status.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with kind `NotFound` if the game does not exist.
    #[instrument(skip(self, update))]
    pub fn record_result(&self, game_id: i32, update: GameResultUpdate) -> Result<Game, DbError> {
        let mut conn = self.connection()?;
        let game = diesel::update(schema::games::table.find(game_id))
            .set(&update)
            .returning(Game::as_returning())
            .get_result(&mut conn)?;
        info!(
            game_id,
            home_score = ?game.home_score(),
            away_score = ?game.away_score(),
            status = %game.status(),
            "Game result recorded"
        );
        Ok(game)
    }
}
