//! Picks.

use diesel::prelude::*;
use diesel::upsert::excluded;
use tracing::{debug, info, instrument};

use super::{PoolRepository, WeekFilter, week_key};
use crate::db::{DbError, Game, NewPick, Pick, User, schema};
use crate::schedule::NflWeek;

impl PoolRepository {
    /// Saves a batch of picks. A pick that already exists for the same
    /// user, game and group is replaced and its grade cleared.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any write fails; no pick is saved.
    #[instrument(skip(self, picks), fields(count = picks.len()))]
    pub fn save_picks(&self, picks: Vec<NewPick>) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let now = chrono::Utc::now().naive_utc();

        let saved = conn.transaction::<_, DbError, _>(|conn| {
            let mut saved = 0;
            for pick in &picks {
                saved += diesel::insert_into(schema::picks::table)
                    .values(pick)
                    .on_conflict((
                        schema::picks::user_id,
                        schema::picks::game_id,
                        schema::picks::group_id,
                    ))
                    .do_update()
                    .set((
                        schema::picks::selection.eq(excluded(schema::picks::selection)),
                        schema::picks::confidence.eq(excluded(schema::picks::confidence)),
                        schema::picks::result.eq(None::<String>),
                        schema::picks::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }
            Ok(saved)
        })?;

        info!(saved, "Picks saved");
        Ok(saved)
    }

    /// Lists a user's picks in a group across all weeks.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn picks_for_member(&self, user_id: i32, group_id: i32) -> Result<Vec<Pick>, DbError> {
        let mut conn = self.connection()?;
        let picks = schema::picks::table
            .filter(schema::picks::user_id.eq(user_id))
            .filter(schema::picks::group_id.eq(group_id))
            .order(schema::picks::id.asc())
            .select(Pick::as_select())
            .load(&mut conn)?;
        debug!(count = picks.len(), "Member picks loaded");
        Ok(picks)
    }

    /// Lists a week's picks with their game and picker, in kickoff order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self), fields(week = %week))]
    pub fn picks_for_week(
        &self,
        week: NflWeek,
        filter: WeekFilter,
    ) -> Result<Vec<(Pick, Game, User)>, DbError> {
        let (season, week_no) = week_key(week);
        let mut conn = self.connection()?;

        let mut query = schema::picks::table
            .inner_join(schema::games::table)
            .inner_join(schema::users::table)
            .filter(schema::games::season.eq(season))
            .filter(schema::games::week.eq(week_no))
            .into_boxed();

        if let Some(group_id) = filter.group_id {
            query = query.filter(schema::picks::group_id.eq(group_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(schema::picks::user_id.eq(user_id));
        }

        let picks = query
            .order((
                schema::games::game_time.asc(),
                schema::games::id.asc(),
                schema::picks::id.asc(),
            ))
            .select((Pick::as_select(), Game::as_select(), User::as_select()))
            .load(&mut conn)?;

        debug!(count = picks.len(), "Week picks loaded");
        Ok(picks)
    }
}
