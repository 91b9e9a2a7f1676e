//! Pickem library - NFL pick'em pools
//!
//! Members of a group pick NFL games against the spread or the total each
//! week. Picks lock at kickoff, are graded once games go final, and roll up
//! into weekly win/loss/tie records per group.
//!
//! # Architecture
//!
//! - **Grading**: pure rules for grading a pick against a game's line
//! - **Schedule**: the NFL calendar and pick locking
//! - **Database**: SQLite persistence via Diesel, one connection per call
//! - **Services**: accounts, groups, games, picks, scoring and standings
//! - **API**: axum router serving the JSON API
//!
//! # Example
//!
//! ```
//! use pickem::{GameLine, GameStatus, PickResult, Selection, grade};
//!
//! let line = GameLine {
//!     home_team: "Philadelphia Eagles".to_string(),
//!     away_team: "Dallas Cowboys".to_string(),
//!     home_score: Some(34),
//!     away_score: Some(30),
//!     spread: Some(-8.5),
//!     over_under: Some(47.5),
//!     status: GameStatus::Final,
//! };
//! assert_eq!(PickResult::Correct, grade(&line, Selection::Away));
//! assert_eq!(PickResult::Correct, grade(&line, Selection::Over));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod db;
mod grading;
mod schedule;
mod services;

// Crate-level exports - Grading rules
pub use grading::{
    GameLine, GameOutcome, GameStatus, PickResult, Selection, SelectionError, Winner, grade,
};

// Crate-level exports - Calendar
pub use schedule::{NflWeek, REGULAR_SEASON_WEEKS, is_locked};

// Crate-level exports - Database types
pub use db::{
    DbError, DbErrorKind, Game, GameResultUpdate, Group, GroupMember, MIGRATIONS, NewGame,
    NewGroup, NewPick, NewSession, NewUser, NewWeeklyScore, Pick, PoolRepository, PublicUser,
    Session, User, WeekFilter, WeekRegrade, WeeklyScore,
};

// Crate-level exports - Services
pub use services::{
    AuthService, AuthSession, CreateGroupRequest, GameInput, GameResultInput, GameService,
    GradedPick, GroupDetail, GroupService, GroupSummary, Leaderboard, MemberInfo, MemberPicks,
    MemberRecord, MemberWeek, MembersWeek, PasswordHasher, PastWeek, PastWeeks, PickInput,
    PickResults, PickService, PickView, ScoringService, ScoringSummary, ServiceError,
    SignInRequest, SignUpRequest, Standing, StandingsService, SubmitPicksRequest, rank_records,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - HTTP API
pub use api::{ApiError, ApiResult, AppState, AuthUser, Envelope, WeekQuery, create_router};
