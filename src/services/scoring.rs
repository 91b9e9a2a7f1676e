//! Weekly scoring: grade final games and rebuild records.

use serde::Serialize;
use tracing::{info, instrument};

use super::ServiceError;
use crate::db::{PoolRepository, WeekFilter};
use crate::grading::grade;
use crate::schedule::NflWeek;

/// What a scoring run touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoringSummary {
    /// Final games considered.
    pub games_processed: usize,
    /// Picks given a stored grade.
    pub picks_graded: usize,
    /// Weekly records written.
    pub scores_updated: usize,
}

/// Grades a week's picks and keeps weekly records current.
#[derive(Debug, Clone)]
pub struct ScoringService {
    repository: PoolRepository,
}

impl ScoringService {
    /// Creates a scoring service.
    #[instrument(skip(repository))]
    pub fn new(repository: PoolRepository) -> Self {
        info!("Creating ScoringService");
        Self { repository }
    }

    /// Grades every pick of the week against its game and rebuilds the
    /// weekly records. Running it again yields the same records.
    ///
    /// Picks on games that are no longer final lose their stored grade, and
    /// records left with no graded pick are removed. A week with no final
    /// games is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] on a database failure.
    #[instrument(skip(self), fields(week = %week))]
    pub fn score_week(
        &self,
        week: NflWeek,
        group_id: Option<i32>,
    ) -> Result<ScoringSummary, ServiceError> {
        let filter = WeekFilter {
            group_id,
            user_id: None,
        };
        let regrade = self.repository.regrade_week(week, filter, |game, pick| {
            Ok(grade(&game.line()?, pick.parse_selection()?))
        })?;

        if regrade.records_removed > 0 {
            info!(removed = regrade.records_removed, "Stale weekly records removed");
        }
        let summary = ScoringSummary {
            games_processed: regrade.final_games,
            picks_graded: regrade.picks_graded,
            scores_updated: regrade.records_written,
        };
        info!(?summary, "Week scored");
        Ok(summary)
    }
}
