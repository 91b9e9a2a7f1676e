//! Pick grades and weekly records.

use std::collections::{BTreeMap, BTreeSet};

use diesel::prelude::*;
use diesel::upsert::excluded;
use tracing::{debug, info, instrument};

use super::{PoolRepository, WeekFilter, week_key};
use crate::db::{DbError, Game, Group, NewWeeklyScore, Pick, User, WeeklyScore, schema};
use crate::grading::{GameStatus, PickResult};
use crate::schedule::NflWeek;

/// Counts from one pass of [`PoolRepository::regrade_week`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekRegrade {
    /// Games of the week that are final with both scores.
    pub final_games: usize,
    /// Picks holding a stored grade after the pass.
    pub picks_graded: usize,
    /// Weekly records written.
    pub records_written: usize,
    /// Weekly records removed because no graded pick backs them any more.
    pub records_removed: usize,
}

impl PoolRepository {
    /// Regrades a week's picks and rebuilds its weekly records in one
    /// transaction.
    ///
    /// `grade_pick` decides each pick's result; [`PickResult::Pending`]
    /// clears a stored grade. Records are recomputed from the grades rather
    /// than incremented, so a second pass leaves totals unchanged, and a
    /// record with no graded pick left is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if grading or any write fails; nothing is stored.
    #[instrument(skip(self, grade_pick), fields(week = %week))]
    pub fn regrade_week<F>(
        &self,
        week: NflWeek,
        filter: WeekFilter,
        mut grade_pick: F,
    ) -> Result<WeekRegrade, DbError>
    where
        F: FnMut(&Game, &Pick) -> Result<PickResult, DbError>,
    {
        let (season, week_no) = week_key(week);
        let mut conn = self.connection()?;
        let now = chrono::Utc::now().naive_utc();

        let regrade = conn.transaction::<_, DbError, _>(|conn| {
            let final_games: i64 = schema::games::table
                .filter(schema::games::season.eq(season))
                .filter(schema::games::week.eq(week_no))
                .filter(schema::games::status.eq(GameStatus::Final.to_string()))
                .filter(schema::games::home_score.is_not_null())
                .filter(schema::games::away_score.is_not_null())
                .count()
                .get_result(conn)?;

            let mut query = schema::picks::table
                .inner_join(schema::games::table)
                .filter(schema::games::season.eq(season))
                .filter(schema::games::week.eq(week_no))
                .into_boxed();
            if let Some(group_id) = filter.group_id {
                query = query.filter(schema::picks::group_id.eq(group_id));
            }
            if let Some(user_id) = filter.user_id {
                query = query.filter(schema::picks::user_id.eq(user_id));
            }
            let picks: Vec<(Pick, Game)> = query
                .select((Pick::as_select(), Game::as_select()))
                .load(conn)?;

            let mut picks_graded = 0;
            let mut records: BTreeMap<(i32, i32), (i32, i32, i32)> = BTreeMap::new();
            for (pick, game) in &picks {
                let result = grade_pick(game, pick)?;
                let stored = (result != PickResult::Pending).then(|| result.to_string());
                if pick.result() != &stored {
                    diesel::update(schema::picks::table.find(*pick.id()))
                        .set((
                            schema::picks::result.eq(&stored),
                            schema::picks::updated_at.eq(now),
                        ))
                        .execute(conn)?;
                }

                let tally = match result {
                    PickResult::Correct => (1, 0, 0),
                    PickResult::Incorrect => (0, 1, 0),
                    PickResult::Tie => (0, 0, 1),
                    PickResult::Pending => continue,
                };
                picks_graded += 1;
                let entry = records
                    .entry((*pick.user_id(), *pick.group_id()))
                    .or_insert((0, 0, 0));
                entry.0 += tally.0;
                entry.1 += tally.1;
                entry.2 += tally.2;
            }

            for (&(user_id, group_id), &(wins, losses, ties)) in &records {
                let record =
                    NewWeeklyScore::new(user_id, group_id, week_no, season, wins, losses, ties);
                diesel::insert_into(schema::weekly_scores::table)
                    .values(&record)
                    .on_conflict((
                        schema::weekly_scores::user_id,
                        schema::weekly_scores::group_id,
                        schema::weekly_scores::week,
                        schema::weekly_scores::season,
                    ))
                    .do_update()
                    .set((
                        schema::weekly_scores::wins.eq(excluded(schema::weekly_scores::wins)),
                        schema::weekly_scores::losses.eq(excluded(schema::weekly_scores::losses)),
                        schema::weekly_scores::ties.eq(excluded(schema::weekly_scores::ties)),
                        schema::weekly_scores::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }

            let mut existing = schema::weekly_scores::table
                .filter(schema::weekly_scores::season.eq(season))
                .filter(schema::weekly_scores::week.eq(week_no))
                .into_boxed();
            if let Some(group_id) = filter.group_id {
                existing = existing.filter(schema::weekly_scores::group_id.eq(group_id));
            }
            if let Some(user_id) = filter.user_id {
                existing = existing.filter(schema::weekly_scores::user_id.eq(user_id));
            }
            let existing: Vec<(i32, i32, i32)> = existing
                .select((
                    schema::weekly_scores::id,
                    schema::weekly_scores::user_id,
                    schema::weekly_scores::group_id,
                ))
                .load(conn)?;
            let kept: BTreeSet<(i32, i32)> = records.keys().copied().collect();
            let stale: Vec<i32> = existing
                .into_iter()
                .filter(|(_, user_id, group_id)| !kept.contains(&(*user_id, *group_id)))
                .map(|(id, _, _)| id)
                .collect();
            let records_removed = if stale.is_empty() {
                0
            } else {
                diesel::delete(
                    schema::weekly_scores::table.filter(schema::weekly_scores::id.eq_any(&stale)),
                )
                .execute(conn)?
            };

            Ok(WeekRegrade {
                final_games: usize::try_from(final_games).unwrap_or(usize::MAX),
                picks_graded,
                records_written: records.len(),
                records_removed,
            })
        })?;

        info!(?regrade, "Week regraded");
        Ok(regrade)
    }

    /// Lists a week's records with user and group, best record first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self), fields(week = %week))]
    pub fn weekly_scores(
        &self,
        week: NflWeek,
        group_id: Option<i32>,
    ) -> Result<Vec<(WeeklyScore, User, Group)>, DbError> {
        let (season, week_no) = week_key(week);
        let mut conn = self.connection()?;

        let mut query = schema::weekly_scores::table
            .inner_join(schema::users::table)
            .inner_join(schema::groups::table)
            .filter(schema::weekly_scores::season.eq(season))
            .filter(schema::weekly_scores::week.eq(week_no))
            .into_boxed();
        if let Some(group_id) = group_id {
            query = query.filter(schema::weekly_scores::group_id.eq(group_id));
        }

        let scores = query
            .order((
                schema::weekly_scores::wins.desc(),
                schema::weekly_scores::losses.asc(),
                schema::weekly_scores::ties.desc(),
                schema::users::name.asc(),
            ))
            .select((
                WeeklyScore::as_select(),
                User::as_select(),
                Group::as_select(),
            ))
            .load(&mut conn)?;

        debug!(count = scores.len(), "Weekly scores loaded");
        Ok(scores)
    }

    /// Lists a group's records for every week of a season before `before_week`,
    /// most recent week first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn weekly_scores_before(
        &self,
        group_id: i32,
        season: i32,
        before_week: i32,
    ) -> Result<Vec<(WeeklyScore, User)>, DbError> {
        let mut conn = self.connection()?;
        let scores = schema::weekly_scores::table
            .inner_join(schema::users::table)
            .filter(schema::weekly_scores::group_id.eq(group_id))
            .filter(schema::weekly_scores::season.eq(season))
            .filter(schema::weekly_scores::week.lt(before_week))
            .order((
                schema::weekly_scores::week.desc(),
                schema::weekly_scores::wins.desc(),
            ))
            .select((WeeklyScore::as_select(), User::as_select()))
            .load(&mut conn)?;
        debug!(count = scores.len(), "Past weekly scores loaded");
        Ok(scores)
    }
}
