//! Game endpoints under /api/games.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::{ApiResult, AppState, WeekQuery, blocking, error::ok};
use crate::db::Game;
use crate::services::{GameInput, GameResultInput};

/// GET /api/games
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<Game>> {
    let week = query.or_current()?;
    ok(blocking(move || state.games.games_for_week(week)).await?)
}

/// POST /api/games - insert or refresh a slate
pub async fn upsert_games(
    State(state): State<AppState>,
    Json(games): Json<Vec<GameInput>>,
) -> ApiResult<Vec<Game>> {
    ok(blocking(move || state.games.ingest_slate(games)).await?)
}

/// PUT /api/games/{id}/result
pub async fn record_result(
    State(state): State<AppState>,
    Path(game_id): Path<i32>,
    Json(input): Json<GameResultInput>,
) -> ApiResult<Game> {
    ok(blocking(move || state.games.record_result(game_id, input)).await?)
}
