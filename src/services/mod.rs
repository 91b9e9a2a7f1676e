//! Business logic over [`PoolRepository`](crate::PoolRepository).
//!
//! Services are synchronous; the HTTP layer runs them on the blocking pool.

mod auth;
mod error;
mod games;
mod groups;
mod password;
mod picks;
mod scoring;
mod standings;

pub use auth::{AuthService, AuthSession, SignInRequest, SignUpRequest};
pub use error::ServiceError;
pub use games::{GameInput, GameResultInput, GameService};
pub use groups::{
    CreateGroupRequest, GroupDetail, GroupService, GroupSummary, MemberInfo, MemberWeek,
    MembersWeek,
};
pub use password::PasswordHasher;
pub use picks::{GradedPick, MemberPicks, PickInput, PickResults, PickService, PickView, SubmitPicksRequest};
pub use scoring::{ScoringService, ScoringSummary};
pub use standings::{
    Leaderboard, MemberRecord, PastWeek, PastWeeks, Standing, StandingsService, rank_records,
};
