//! Scoring and standings endpoints.

use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;

use super::extract::week_in_season;
use super::{ApiResult, AppState, WeekQuery, blocking, error::ok};
use crate::db::WeeklyScore;
use crate::schedule::NflWeek;
use crate::services::{Leaderboard, PastWeeks, ScoringSummary};

/// `?current_week&current_season` for the history view.
#[derive(Debug, Default, Deserialize)]
pub struct PastWeeksQuery {
    current_week: Option<i32>,
    current_season: Option<i32>,
}

/// POST /api/score-picks
pub async fn score_picks(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<ScoringSummary> {
    let week = query.required()?;
    let group_id = query.group_id;
    ok(blocking(move || state.scoring.score_week(week, group_id)).await?)
}

/// GET /api/weekly-scores
pub async fn weekly_scores(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Leaderboard> {
    let week = query.required()?;
    let group_id = query.group_id;
    ok(blocking(move || state.standings.leaderboard(week, group_id)).await?)
}

/// GET /api/groups/{id}/weekly-scores
pub async fn group_weekly_scores(
    State(state): State<AppState>,
    Path(group_id): Path<i32>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<WeeklyScore>> {
    let week = query.or_current()?;
    ok(blocking(move || state.standings.group_weekly_scores(group_id, week)).await?)
}

/// GET /api/groups/{id}/past-weeks
pub async fn past_weeks(
    State(state): State<AppState>,
    Path(group_id): Path<i32>,
    Query(query): Query<PastWeeksQuery>,
) -> ApiResult<PastWeeks> {
    let now = NflWeek::current(Utc::now().naive_utc());
    let current = week_in_season(
        query.current_season.unwrap_or(*now.season()),
        query.current_week.unwrap_or(*now.week()),
    )?;
    ok(blocking(move || state.standings.past_weeks(group_id, current)).await?)
}
