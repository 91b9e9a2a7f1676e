//! NFL calendar: which season and week a moment falls in, and pick locking.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of regular-season weeks.
pub const REGULAR_SEASON_WEEKS: i32 = 18;

/// Days from Thursday kickoff through Monday night, inclusive.
const GAME_WINDOW_DAYS: i64 = 5;

/// A week of an NFL season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct NflWeek {
    season: i32,
    week: i32,
}

impl NflWeek {
    /// Creates a week, clamping the week number into the regular season.
    pub fn new(season: i32, week: i32) -> Self {
        Self {
            season,
            week: week.clamp(1, REGULAR_SEASON_WEEKS),
        }
    }

    /// Opening Thursday of a season: the Thursday after Labor Day.
    #[instrument]
    pub fn kickoff(season: i32) -> Option<NaiveDate> {
        let first = NaiveDate::from_ymd_opt(season, 9, 1)?;
        let to_monday = (7 - i64::from(first.weekday().num_days_from_monday())) % 7;
        let labor_day = first + Duration::days(to_monday);
        debug_assert_eq!(labor_day.weekday(), Weekday::Mon);
        Some(labor_day + Duration::days(3))
    }

    /// The week a moment falls in.
    ///
    /// The first five days from kickoff (Thursday through Monday) are
    /// week 1; each following Tuesday starts the next week. Anything before
    /// a season's kickoff belongs to the final week of the previous season.
    #[instrument]
    pub fn current(now: NaiveDateTime) -> Self {
        let today = now.date();
        let year = today.year();
        let previous = Self::new(year - 1, REGULAR_SEASON_WEEKS);

        let Some(kickoff) = Self::kickoff(year) else {
            return previous;
        };
        if today < kickoff {
            return previous;
        }

        let days = (today - kickoff).num_days();
        let week = if days < GAME_WINDOW_DAYS {
            1
        } else {
            (days - GAME_WINDOW_DAYS) / 7 + 2
        };
        let week = i32::try_from(week).unwrap_or(REGULAR_SEASON_WEEKS);
        Self::new(year, week)
    }

    /// The current week by the wall clock (UTC).
    pub fn now() -> Self {
        Self::current(chrono::Utc::now().naive_utc())
    }
}

impl std::fmt::Display for NflWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Week {}, {}", self.week, self.season)
    }
}

/// Picks on a game lock at kickoff.
pub fn is_locked(game_time: NaiveDateTime, now: NaiveDateTime) -> bool {
    now >= game_time
}
