//! Group endpoints under /api/groups.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;

use super::{ApiResult, AppState, AuthUser, WeekQuery, blocking, error::ok};
use crate::db::Group;
use crate::services::{CreateGroupRequest, GroupDetail, GroupSummary, MembersWeek};

/// Join form; the password is only checked for protected groups.
#[derive(Debug, Default, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    password: Option<String>,
}

/// GET /api/groups
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Vec<GroupSummary>> {
    ok(blocking(move || state.groups.list_groups()).await?)
}

/// POST /api/groups
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateGroupRequest>,
) -> ApiResult<Group> {
    ok(blocking(move || state.groups.create_group(&auth.user, request)).await?)
}

/// GET /api/groups/{id}
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<i32>,
) -> ApiResult<GroupDetail> {
    let now = Utc::now().naive_utc();
    ok(blocking(move || state.groups.group_detail(group_id, now)).await?)
}

/// DELETE /api/groups/{id}
pub async fn delete_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<i32>,
) -> ApiResult<Group> {
    ok(blocking(move || state.groups.delete_group(&auth.user, group_id)).await?)
}

/// POST /api/groups/{id}/join
pub async fn join_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<i32>,
    request: Option<Json<JoinRequest>>,
) -> ApiResult<Group> {
    let Json(request) = request.unwrap_or_default();
    ok(blocking(move || {
        state
            .groups
            .join_group(&auth.user, group_id, request.password.as_deref())
    })
    .await?)
}

/// GET /api/groups/{id}/members
pub async fn members(
    State(state): State<AppState>,
    Path(group_id): Path<i32>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<MembersWeek> {
    let week = query.or_current()?;
    ok(blocking(move || state.groups.members_for_week(group_id, week)).await?)
}
