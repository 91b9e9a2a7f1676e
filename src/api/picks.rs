//! Pick endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, AppState, AuthUser, WeekQuery, blocking, error::ok};
use crate::db::{Pick, WeekFilter};
use crate::services::{MemberPicks, PickResults, PickView, SubmitPicksRequest};

/// `?group_id` for the caller's own picks.
#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    group_id: Option<i32>,
}

/// Submission acknowledgement.
#[derive(Debug, Serialize)]
pub struct Submitted {
    message: String,
    count: usize,
}

/// POST /api/picks
pub async fn submit_picks(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SubmitPicksRequest>,
) -> ApiResult<Submitted> {
    let now = Utc::now().naive_utc();
    let count = blocking(move || state.picks.submit(&auth.user, request, now)).await?;
    ok(Submitted {
        message: format!("Successfully submitted {} picks", count),
        count,
    })
}

/// GET /api/picks?group_id=
pub async fn my_picks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<GroupQuery>,
) -> ApiResult<Vec<Pick>> {
    let group_id = query
        .group_id
        .ok_or_else(|| ApiError::bad_request("group_id is required"))?;
    ok(blocking(move || state.picks.my_picks(&auth.user, group_id)).await?)
}

/// GET /api/groups/{id}/members/{user_id}/picks
pub async fn member_picks(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(i32, i32)>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<MemberPicks> {
    let week = query.or_current()?;
    ok(blocking(move || state.picks.member_picks(group_id, user_id, week)).await?)
}

/// GET /api/groups/{id}/picks
pub async fn group_picks(
    State(state): State<AppState>,
    Path(group_id): Path<i32>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<PickView>> {
    let week = query.or_current()?;
    ok(blocking(move || state.picks.group_picks(group_id, week)).await?)
}

/// GET /api/pick-results
pub async fn pick_results(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<PickResults> {
    let week = query.required()?;
    let filter = WeekFilter {
        group_id: query.group_id,
        user_id: query.user_id,
    };
    ok(blocking(move || state.picks.pick_results(week, filter)).await?)
}
