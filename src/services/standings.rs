//! Leaderboards and week-by-week history.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::{GroupService, ServiceError};
use crate::db::{PoolRepository, WeeklyScore};
use crate::schedule::NflWeek;

/// A leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    /// Weekly score id.
    pub id: i32,
    /// User id.
    pub user_id: i32,
    /// Display name.
    pub user_name: String,
    /// Group id.
    pub group_id: i32,
    /// Group name.
    pub group_name: String,
    /// Week number.
    pub week: i32,
    /// Season year.
    pub season: i32,
    /// Correct picks.
    pub wins: i32,
    /// Incorrect picks.
    pub losses: i32,
    /// Pushes.
    pub ties: i32,
    /// Graded picks.
    pub total_picks: i32,
    /// Wins over graded picks, as a rounded percentage.
    pub win_percentage: i32,
}

/// A week's leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    /// The week shown.
    pub week: NflWeek,
    /// Rows, best record first.
    pub scores: Vec<Standing>,
}

/// A member's record in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    /// User id.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Correct picks.
    pub wins: i32,
    /// Incorrect picks.
    pub losses: i32,
    /// Pushes.
    pub ties: i32,
}

/// One completed week of a group.
#[derive(Debug, Clone, Serialize)]
pub struct PastWeek {
    /// Week number.
    pub week: i32,
    /// Every member, best record first.
    pub members: Vec<MemberRecord>,
    /// Top member, if they won at least one pick.
    pub overall_winner: Option<MemberRecord>,
}

/// A group's completed weeks, most recent first.
#[derive(Debug, Clone, Serialize)]
pub struct PastWeeks {
    /// Season covered.
    pub season: i32,
    /// The weeks.
    pub weeks: Vec<PastWeek>,
    /// Number of weeks.
    pub total_weeks: usize,
}

/// Orders records by wins (desc), then losses (asc), then ties (desc).
pub fn rank_records(a: (i32, i32, i32), b: (i32, i32, i32)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| a.1.cmp(&b.1))
        .then_with(|| b.2.cmp(&a.2))
}

fn win_percentage(wins: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(total) * 100.0).round() as i32
}

/// Standings queries.
#[derive(Debug, Clone)]
pub struct StandingsService {
    repository: PoolRepository,
    groups: GroupService,
}

impl StandingsService {
    /// Creates a standings service.
    #[instrument(skip(repository, groups))]
    pub fn new(repository: PoolRepository, groups: GroupService) -> Self {
        info!("Creating StandingsService");
        Self { repository, groups }
    }

    /// The week's records across groups, or for one group.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] on a database failure.
    #[instrument(skip(self), fields(week = %week))]
    pub fn leaderboard(
        &self,
        week: NflWeek,
        group_id: Option<i32>,
    ) -> Result<Leaderboard, ServiceError> {
        let scores = self
            .repository
            .weekly_scores(week, group_id)?
            .into_iter()
            .map(|(score, user, group)| Standing {
                id: *score.id(),
                user_id: *score.user_id(),
                user_name: user.name().clone(),
                group_id: *score.group_id(),
                group_name: group.name().clone(),
                week: *score.week(),
                season: *score.season(),
                wins: *score.wins(),
                losses: *score.losses(),
                ties: *score.ties(),
                total_picks: score.total_picks(),
                win_percentage: win_percentage(*score.wins(), score.total_picks()),
            })
            .collect();
        Ok(Leaderboard { week, scores })
    }

    /// A group's stored records for a week.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the group does not exist.
    #[instrument(skip(self), fields(week = %week))]
    pub fn group_weekly_scores(
        &self,
        group_id: i32,
        week: NflWeek,
    ) -> Result<Vec<WeeklyScore>, ServiceError> {
        self.groups.require_group(group_id)?;
        Ok(self
            .repository
            .weekly_scores(week, Some(group_id))?
            .into_iter()
            .map(|(score, _, _)| score)
            .collect())
    }

    /// Every scored week of the season before `current`, with members who
    /// have no record that week listed at 0-0-0.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the group does not exist.
    #[instrument(skip(self), fields(current = %current))]
    pub fn past_weeks(&self, group_id: i32, current: NflWeek) -> Result<PastWeeks, ServiceError> {
        self.groups.require_group(group_id)?;
        let members: Vec<(i32, String)> = self
            .repository
            .list_members(group_id)?
            .into_iter()
            .map(|(_, user)| (*user.id(), user.name().clone()))
            .collect();

        let mut by_week: BTreeMap<i32, HashMap<i32, (i32, i32, i32)>> = BTreeMap::new();
        for (score, _) in self.repository.weekly_scores_before(
            group_id,
            *current.season(),
            *current.week(),
        )? {
            by_week
                .entry(*score.week())
                .or_default()
                .insert(*score.user_id(), (*score.wins(), *score.losses(), *score.ties()));
        }

        let weeks: Vec<PastWeek> = by_week
            .into_iter()
            .rev()
            .map(|(week, records)| {
                let mut rows: Vec<MemberRecord> = members
                    .iter()
                    .map(|(id, name)| {
                        let (wins, losses, ties) = records.get(id).copied().unwrap_or_default();
                        MemberRecord {
                            id: *id,
                            name: name.clone(),
                            wins,
                            losses,
                            ties,
                        }
                    })
                    .collect();
                rows.sort_by(|a, b| {
                    rank_records((a.wins, a.losses, a.ties), (b.wins, b.losses, b.ties))
                        .then_with(|| a.name.cmp(&b.name))
                });
                let overall_winner = rows.first().filter(|top| top.wins > 0).cloned();
                PastWeek {
                    week,
                    members: rows,
                    overall_winner,
                }
            })
            .collect();

        debug!(weeks = weeks.len(), "Past weeks assembled");
        Ok(PastWeeks {
            season: *current.season(),
            total_weeks: weeks.len(),
            weeks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_prefers_wins_then_fewer_losses_then_ties() {
        let mut records = vec![(5, 3, 0), (7, 1, 0), (5, 2, 0), (5, 2, 1)];
        records.sort_by(|a, b| rank_records(*a, *b));
        assert_eq!(vec![(7, 1, 0), (5, 2, 1), (5, 2, 0), (5, 3, 0)], records);
    }

    #[test]
    fn win_percentage_rounds_and_handles_empty() {
        assert_eq!(0, win_percentage(0, 0));
        assert_eq!(67, win_percentage(2, 3));
        assert_eq!(100, win_percentage(4, 4));
        assert_eq!(33, win_percentage(1, 3));
    }
}
