//! Database models.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::grading::{GameLine, GameStatus, PickResult, Selection};

/// User account.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    username: String,
    name: String,
    password_hash: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Insertable user.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    username: String,
    name: String,
    password_hash: String,
}

/// The parts of a user that leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct PublicUser {
    id: i32,
    username: String,
    name: String,
    created_at: NaiveDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

/// Sign-in session.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::sessions)]
#[diesel(belongs_to(User))]
pub struct Session {
    id: i32,
    token: String,
    user_id: i32,
    created_at: NaiveDateTime,
}

/// Insertable session.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::sessions)]
pub struct NewSession {
    token: String,
    user_id: i32,
}

/// Pick'em group.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::groups)]
pub struct Group {
    id: i32,
    name: String,
    description: Option<String>,
    #[serde(skip)]
    password_hash: Option<String>,
    created_by: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Group {
    /// Whether joining requires a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Insertable group.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::groups)]
pub struct NewGroup {
    name: String,
    description: Option<String>,
    password_hash: Option<String>,
    created_by: i32,
}

/// Membership of a user in a group.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::group_members)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Group))]
pub struct GroupMember {
    id: i32,
    user_id: i32,
    group_id: i32,
    joined_at: NaiveDateTime,
}

/// Insertable membership.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::group_members)]
pub struct NewGroupMember {
    user_id: i32,
    group_id: i32,
}

/// NFL game with its betting line.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::games)]
pub struct Game {
    id: i32,
    external_id: String,
    week: i32,
    season: i32,
    home_team: String,
    away_team: String,
    home_score: Option<i32>,
    away_score: Option<i32>,
    spread: Option<f64>,
    over_under: Option<f64>,
    game_time: NaiveDateTime,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Game {
    /// Parses the stored status.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown status.
    #[instrument(skip(self), fields(game_id = self.id, status = %self.status))]
    pub fn parse_status(&self) -> Result<GameStatus, DbError> {
        self.status
            .parse()
            .map_err(|_| DbError::new(format!("Invalid game status: '{}'", self.status)))
    }

    /// The numbers a pick on this game is graded against.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored status is invalid.
    pub fn line(&self) -> Result<GameLine, DbError> {
        Ok(GameLine {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            spread: self.spread,
            over_under: self.over_under,
            status: self.parse_status()?,
        })
    }
}

/// A game as ingested from a slate, also the changeset when a slate is
/// re-ingested. A `None` status or line leaves the stored value alone.
#[derive(Debug, Clone, AsChangeset, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    external_id: String,
    week: i32,
    season: i32,
    home_team: String,
    away_team: String,
    spread: Option<f64>,
    over_under: Option<f64>,
    game_time: NaiveDateTime,
    status: Option<String>,
}

/// Row written when a slate brings a game not seen before.
#[derive(Debug, Insertable)]
#[diesel(table_name = schema::games)]
pub(crate) struct GameInsert<'a> {
    external_id: &'a str,
    week: i32,
    season: i32,
    home_team: &'a str,
    away_team: &'a str,
    spread: Option<f64>,
    over_under: Option<f64>,
    game_time: NaiveDateTime,
    status: String,
}

impl<'a> From<&'a NewGame> for GameInsert<'a> {
    fn from(game: &'a NewGame) -> Self {
        Self {
            external_id: &game.external_id,
            week: game.week,
            season: game.season,
            home_team: &game.home_team,
            away_team: &game.away_team,
            spread: game.spread,
            over_under: game.over_under,
            game_time: game.game_time,
            status: game
                .status
                .clone()
                .unwrap_or_else(|| GameStatus::default().to_string()),
        }
    }
}

/// Score update for a game.
#[derive(Debug, Clone, AsChangeset, new)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct GameResultUpdate {
    home_score: Option<i32>,
    away_score: Option<i32>,
    status: String,
    updated_at: NaiveDateTime,
}

/// A user's pick on a game within a group.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::picks)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Game))]
#[diesel(belongs_to(Group))]
pub struct Pick {
    id: i32,
    user_id: i32,
    game_id: i32,
    group_id: i32,
    selection: String,
    confidence: Option<i32>,
    result: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Pick {
    /// Parses the stored selection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown selection.
    #[instrument(skip(self), fields(pick_id = self.id, selection = %self.selection))]
    pub fn parse_selection(&self) -> Result<Selection, DbError> {
        self.selection
            .parse()
            .map_err(|_| DbError::new(format!("Invalid selection: '{}'", self.selection)))
    }

    /// Parses the stored result, if graded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown result.
    #[instrument(skip(self), fields(pick_id = self.id))]
    pub fn parse_result(&self) -> Result<Option<PickResult>, DbError> {
        self.result
            .as_deref()
            .map(|r| {
                r.parse()
                    .map_err(|_| DbError::new(format!("Invalid pick result: '{}'", r)))
            })
            .transpose()
    }
}

/// Insertable pick.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::picks)]
pub struct NewPick {
    user_id: i32,
    game_id: i32,
    group_id: i32,
    selection: String,
    confidence: Option<i32>,
}

/// A user's win/loss/tie record for one week in one group.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::weekly_scores)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Group))]
pub struct WeeklyScore {
    id: i32,
    user_id: i32,
    group_id: i32,
    week: i32,
    season: i32,
    wins: i32,
    losses: i32,
    ties: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl WeeklyScore {
    /// Graded picks counted in this record.
    pub fn total_picks(&self) -> i32 {
        self.wins + self.losses + self.ties
    }
}

/// Insertable weekly score, also the changeset when a week is re-scored.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::weekly_scores)]
pub struct NewWeeklyScore {
    user_id: i32,
    group_id: i32,
    week: i32,
    season: i32,
    wins: i32,
    losses: i32,
    ties: i32,
}
