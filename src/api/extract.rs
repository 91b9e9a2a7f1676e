//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use serde::Deserialize;

use super::{ApiError, AppState, blocking};
use crate::db::User;
use crate::schedule::{NflWeek, REGULAR_SEASON_WEEKS};

/// The signed-in user, from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user.
    pub user: User,
    /// Session token presented.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?
            .to_string();

        let auth = state.auth.clone();
        let lookup = token.clone();
        let user = blocking(move || auth.authenticate(&lookup)).await?;
        Ok(Self { user, token })
    }
}

/// Week-scoped query string: `?week&season&group_id&user_id`, all optional.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WeekQuery {
    /// Week number.
    pub week: Option<i32>,
    /// Season year.
    pub season: Option<i32>,
    /// Optional group narrowing.
    pub group_id: Option<i32>,
    /// Optional user narrowing.
    pub user_id: Option<i32>,
}

impl WeekQuery {
    /// The requested week, filling gaps from the current week.
    ///
    /// # Errors
    ///
    /// Returns a 400 if a given week is out of range.
    pub fn or_current(&self) -> Result<NflWeek, ApiError> {
        let current = NflWeek::current(Utc::now().naive_utc());
        week_in_season(
            self.season.unwrap_or(*current.season()),
            self.week.unwrap_or(*current.week()),
        )
    }

    /// The requested week; both parts must be given.
    ///
    /// # Errors
    ///
    /// Returns a 400 if either is missing or the week is out of range.
    pub fn required(&self) -> Result<NflWeek, ApiError> {
        match (self.week, self.season) {
            (Some(week), Some(season)) => week_in_season(season, week),
            _ => Err(ApiError::bad_request("Week and season are required")),
        }
    }
}

/// Builds a regular-season week, rejecting numbers outside it.
pub(crate) fn week_in_season(season: i32, week: i32) -> Result<NflWeek, ApiError> {
    if (1..=REGULAR_SEASON_WEEKS).contains(&week) {
        Ok(NflWeek::new(season, week))
    } else {
        Err(ApiError::bad_request(format!(
            "Week must be between 1 and {}",
            REGULAR_SEASON_WEEKS
        )))
    }
}
