//! Pick submission and pick views.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{GroupService, ServiceError};
use crate::db::{Game, NewPick, Pick, PoolRepository, PublicUser, User, WeekFilter};
use crate::grading::{GameOutcome, PickResult, Selection, grade};
use crate::schedule::{NflWeek, is_locked};

/// One pick in a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct PickInput {
    /// Game picked.
    #[serde(alias = "gameId")]
    pub game_id: i32,
    /// `home`, `away`, `over`, `under`, or a team name.
    pub pick: String,
    /// Optional confidence weight.
    #[serde(default)]
    pub confidence: Option<i32>,
}

/// A batch of picks for one group.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitPicksRequest {
    /// Group the picks belong to.
    #[serde(alias = "groupId")]
    pub group_id: i32,
    /// The picks.
    pub picks: Vec<PickInput>,
}

/// A pick with its game and picker, as shown to members.
#[derive(Debug, Clone, Serialize)]
pub struct PickView {
    /// Pick id.
    pub id: i32,
    /// Picker's id.
    pub user_id: i32,
    /// Picker's display name.
    pub user_name: String,
    /// Group id.
    pub group_id: i32,
    /// Game id.
    pub game_id: i32,
    /// Normalized selection.
    pub selection: Selection,
    /// Team name or `over`/`under`.
    pub pick: String,
    /// Confidence weight.
    pub confidence: Option<i32>,
    /// Stored grade, once scored.
    pub result: Option<PickResult>,
    /// When the pick was made.
    pub created_at: NaiveDateTime,
    /// The game.
    pub game: Game,
}

impl PickView {
    fn build(pick: Pick, game: Game, user: &User) -> Result<Self, ServiceError> {
        let selection = pick.parse_selection()?;
        Ok(Self {
            id: *pick.id(),
            user_id: *pick.user_id(),
            user_name: user.name().clone(),
            group_id: *pick.group_id(),
            game_id: *pick.game_id(),
            selection,
            pick: selection
                .label(game.home_team(), game.away_team())
                .to_string(),
            confidence: *pick.confidence(),
            result: pick.parse_result()?,
            created_at: *pick.created_at(),
            game,
        })
    }
}

/// A pick graded against the game's current score.
#[derive(Debug, Clone, Serialize)]
pub struct GradedPick {
    /// The pick.
    #[serde(flatten)]
    pub pick: PickView,
    /// Grade computed now.
    pub grade: PickResult,
    /// Straight-up result of the game.
    pub game_result: GameOutcome,
}

/// One member's picks for a week.
#[derive(Debug, Clone, Serialize)]
pub struct MemberPicks {
    /// The member.
    pub user: PublicUser,
    /// The week shown.
    pub week: NflWeek,
    /// Picks in kickoff order.
    pub picks: Vec<PickView>,
    /// Number of picks.
    pub total_picks: usize,
}

/// Graded picks for a week.
#[derive(Debug, Clone, Serialize)]
pub struct PickResults {
    /// The week graded.
    pub week: NflWeek,
    /// Picks with live grades.
    pub picks: Vec<GradedPick>,
}

/// Pick operations.
#[derive(Debug, Clone)]
pub struct PickService {
    repository: PoolRepository,
    groups: GroupService,
}

impl PickService {
    /// Creates a pick service.
    #[instrument(skip(repository, groups))]
    pub fn new(repository: PoolRepository, groups: GroupService) -> Self {
        info!("Creating PickService");
        Self { repository, groups }
    }

    /// Saves a batch of picks. The batch is all-or-nothing: a single
    /// missing, started or unrecognised game rejects every pick.
    ///
    /// Returns the number of picks saved.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if the group does not exist
    /// - [`ServiceError::Forbidden`] if the user is not a member
    /// - [`ServiceError::GamesMissing`] if any game id is unknown
    /// - [`ServiceError::GamesLocked`] if any game has kicked off
    /// - [`ServiceError::Validation`] for an empty batch, a game picked twice,
    ///   or an unrecognised pick
    #[instrument(
        skip(self, user, request, now),
        fields(user_id = user.id(), group_id = request.group_id, count = request.picks.len())
    )]
    pub fn submit(
        &self,
        user: &User,
        request: SubmitPicksRequest,
        now: NaiveDateTime,
    ) -> Result<usize, ServiceError> {
        if request.picks.is_empty() {
            return Err(ServiceError::validation("No picks provided"));
        }
        self.groups.require_group(request.group_id)?;
        self.groups.require_member(*user.id(), request.group_id)?;

        let ids: BTreeSet<i32> = request.picks.iter().map(|p| p.game_id).collect();
        if ids.len() != request.picks.len() {
            return Err(ServiceError::validation(
                "Each game can only be picked once per submission",
            ));
        }
        let ids: Vec<i32> = ids.into_iter().collect();
        let games: HashMap<i32, Game> = self
            .repository
            .games_by_ids(&ids)?
            .into_iter()
            .map(|g| (*g.id(), g))
            .collect();

        let missing: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| !games.contains_key(id))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Picks reference unknown games");
            return Err(ServiceError::GamesMissing(missing));
        }

        let locked: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| {
                games
                    .get(id)
                    .is_some_and(|g| is_locked(*g.game_time(), now))
            })
            .collect();
        if !locked.is_empty() {
            warn!(?locked, "Picks submitted after kickoff");
            return Err(ServiceError::GamesLocked(locked));
        }

        let mut rows = Vec::with_capacity(request.picks.len());
        for input in request.picks {
            let Some(game) = games.get(&input.game_id) else {
                return Err(ServiceError::GamesMissing(vec![input.game_id]));
            };
            if input.confidence.is_some_and(|c| c < 1) {
                return Err(ServiceError::validation(
                    "Confidence must be a positive number",
                ));
            }
            let selection = Selection::resolve(&input.pick, game.home_team(), game.away_team())
                .map_err(|e| ServiceError::validation(format!("Game {}: {}", game.id(), e)))?;
            rows.push(NewPick::new(
                *user.id(),
                input.game_id,
                request.group_id,
                selection.to_string(),
                input.confidence,
            ));
        }

        Ok(self.repository.save_picks(rows)?)
    }

    /// The user's own picks in a group, across all weeks.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] if the user is not a member.
    #[instrument(skip(self, user), fields(user_id = user.id()))]
    pub fn my_picks(&self, user: &User, group_id: i32) -> Result<Vec<Pick>, ServiceError> {
        self.groups.require_member(*user.id(), group_id)?;
        Ok(self.repository.picks_for_member(*user.id(), group_id)?)
    }

    /// One member's picks for a week.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the group or user does not
    /// exist, or the user is not in the group.
    #[instrument(skip(self), fields(week = %week))]
    pub fn member_picks(
        &self,
        group_id: i32,
        user_id: i32,
        week: NflWeek,
    ) -> Result<MemberPicks, ServiceError> {
        self.groups.require_group(group_id)?;
        let user = self
            .repository
            .get_user(user_id)?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;
        if !self.repository.is_member(user_id, group_id)? {
            return Err(ServiceError::not_found("User is not a member of this group"));
        }

        let filter = WeekFilter {
            group_id: Some(group_id),
            user_id: Some(user_id),
        };
        let picks = self.views(week, filter)?;
        Ok(MemberPicks {
            user: PublicUser::from(&user),
            week,
            total_picks: picks.len(),
            picks,
        })
    }

    /// All picks in a group for a week.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the group does not exist.
    #[instrument(skip(self), fields(week = %week))]
    pub fn group_picks(&self, group_id: i32, week: NflWeek) -> Result<Vec<PickView>, ServiceError> {
        self.groups.require_group(group_id)?;
        self.views(week, WeekFilter::group(group_id))
    }

    /// A week's picks graded against current scores, without storing grades.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] on a database failure.
    #[instrument(skip(self), fields(week = %week))]
    pub fn pick_results(
        &self,
        week: NflWeek,
        filter: WeekFilter,
    ) -> Result<PickResults, ServiceError> {
        let picks = self
            .views(week, filter)?
            .into_iter()
            .map(|view| -> Result<GradedPick, ServiceError> {
                let line = view.game.line()?;
                Ok(GradedPick {
                    grade: grade(&line, view.selection),
                    game_result: line.outcome(),
                    pick: view,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = picks.len(), "Picks graded");
        Ok(PickResults { week, picks })
    }

    fn views(&self, week: NflWeek, filter: WeekFilter) -> Result<Vec<PickView>, ServiceError> {
        self.repository
            .picks_for_week(week, filter)?
            .into_iter()
            .map(|(pick, game, user)| PickView::build(pick, game, &user))
            .collect()
    }
}
