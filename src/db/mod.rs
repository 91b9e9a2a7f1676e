//! Database persistence layer for users, groups, games, picks and weekly scores.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{
    Game, GameResultUpdate, Group, GroupMember, NewGame, NewGroup, NewGroupMember, NewPick,
    NewSession, NewUser, NewWeeklyScore, Pick, PublicUser, Session, User, WeeklyScore,
};
pub use repository::{MIGRATIONS, PoolRepository, WeekFilter, WeekRegrade};
