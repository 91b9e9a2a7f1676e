//! Groups, memberships and the per-week member view.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{PasswordHasher, ServiceError};
use crate::db::{Group, NewGroup, PoolRepository, User, WeekFilter};
use crate::schedule::NflWeek;

/// Group creation form.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional join password. Blank means open.
    #[serde(default)]
    pub password: Option<String>,
}

/// A group in the directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    /// The group.
    #[serde(flatten)]
    pub group: Group,
    /// Whether joining requires a password.
    pub has_password: bool,
    /// Number of members.
    pub member_count: i64,
}

/// A member as listed on a group's page.
#[derive(Debug, Clone, Serialize)]
pub struct MemberInfo {
    /// User id.
    pub id: i32,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// When the user joined.
    pub joined_at: NaiveDateTime,
}

/// A group with its members and the week being played.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetail {
    /// Group and counts.
    #[serde(flatten)]
    pub summary: GroupSummary,
    /// The current week.
    pub current_week: NflWeek,
    /// Members in join order.
    pub members: Vec<MemberInfo>,
}

/// A member's activity in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWeek {
    /// User id.
    pub id: i32,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Whether the member has picked anything this week.
    pub has_picks: bool,
    /// Number of picks this week.
    pub pick_count: usize,
    /// Correct picks, once scored.
    pub wins: i32,
    /// Incorrect picks, once scored.
    pub losses: i32,
    /// Pushes, once scored.
    pub ties: i32,
}

/// Every member's activity for one week.
#[derive(Debug, Clone, Serialize)]
pub struct MembersWeek {
    /// The week shown.
    pub week: NflWeek,
    /// Members in join order.
    pub members: Vec<MemberWeek>,
}

/// Group operations.
#[derive(Debug, Clone)]
pub struct GroupService {
    repository: PoolRepository,
    hasher: PasswordHasher,
}

impl GroupService {
    /// Creates a group service.
    #[instrument(skip(repository))]
    pub fn new(repository: PoolRepository, hasher: PasswordHasher) -> Self {
        info!("Creating GroupService");
        Self { repository, hasher }
    }

    /// Creates a group with `creator` as its first member.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] if the name is blank.
    #[instrument(skip(self, creator, request), fields(creator = creator.id(), name = %request.name))]
    pub fn create_group(
        &self,
        creator: &User,
        request: CreateGroupRequest,
    ) -> Result<Group, ServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Group name is required"));
        }

        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let password_hash = match request.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        Ok(self.repository.create_group(NewGroup::new(
            name.to_string(),
            description,
            password_hash,
            *creator.id(),
        ))?)
    }

    /// All groups with member counts.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] on a database failure.
    #[instrument(skip(self))]
    pub fn list_groups(&self) -> Result<Vec<GroupSummary>, ServiceError> {
        Ok(self
            .repository
            .list_groups()?
            .into_iter()
            .map(|(group, member_count)| GroupSummary {
                has_password: group.has_password(),
                group,
                member_count,
            })
            .collect())
    }

    /// Loads a group or fails with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there is no such group.
    #[instrument(skip(self))]
    pub fn require_group(&self, group_id: i32) -> Result<Group, ServiceError> {
        self.repository
            .get_group(group_id)?
            .ok_or_else(|| ServiceError::not_found("Group not found"))
    }

    /// Fails with `Forbidden` unless the user belongs to the group.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Forbidden`] for non-members.
    #[instrument(skip(self))]
    pub fn require_member(&self, user_id: i32, group_id: i32) -> Result<(), ServiceError> {
        if self.repository.is_member(user_id, group_id)? {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "You are not a member of this group".to_string(),
            ))
        }
    }

    /// A group with its members.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there is no such group.
    #[instrument(skip(self))]
    pub fn group_detail(
        &self,
        group_id: i32,
        now: NaiveDateTime,
    ) -> Result<GroupDetail, ServiceError> {
        let group = self.require_group(group_id)?;
        let members: Vec<MemberInfo> = self
            .repository
            .list_members(group_id)?
            .into_iter()
            .map(|(member, user)| MemberInfo {
                id: *user.id(),
                username: user.username().clone(),
                name: user.name().clone(),
                joined_at: *member.joined_at(),
            })
            .collect();

        Ok(GroupDetail {
            summary: GroupSummary {
                has_password: group.has_password(),
                member_count: i64::try_from(members.len()).unwrap_or(i64::MAX),
                group,
            },
            current_week: NflWeek::current(now),
            members,
        })
    }

    /// Deletes a group. Only its creator may do so.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if there is no such group
    /// - [`ServiceError::Forbidden`] if `requester` did not create it
    #[instrument(skip(self, requester), fields(requester = requester.id()))]
    pub fn delete_group(&self, requester: &User, group_id: i32) -> Result<Group, ServiceError> {
        let group = self.require_group(group_id)?;
        if group.created_by() != requester.id() {
            warn!(created_by = group.created_by(), "Delete refused");
            return Err(ServiceError::Forbidden(
                "Only the group creator can delete this group".to_string(),
            ));
        }
        self.repository.delete_group(group_id)?;
        Ok(group)
    }

    /// Joins a group, checking its password if it has one.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if there is no such group
    /// - [`ServiceError::Unauthorized`] if the password is wrong
    /// - [`ServiceError::Conflict`] if the user is already a member
    #[instrument(skip(self, user, password), fields(user_id = user.id()))]
    pub fn join_group(
        &self,
        user: &User,
        group_id: i32,
        password: Option<&str>,
    ) -> Result<Group, ServiceError> {
        let group = self.require_group(group_id)?;

        if let Some(hash) = group.password_hash() {
            let supplied = password.unwrap_or_default();
            if !self.hasher.verify(supplied, hash) {
                return Err(ServiceError::Unauthorized(
                    "Incorrect group password".to_string(),
                ));
            }
        }

        if self.repository.is_member(*user.id(), group_id)? {
            return Err(ServiceError::Conflict(
                "You are already a member of this group".to_string(),
            ));
        }

        self.repository
            .add_member(*user.id(), group_id)
            .map_err(|e| {
                if e.is_conflict() {
                    ServiceError::Conflict("You are already a member of this group".to_string())
                } else {
                    e.into()
                }
            })?;
        Ok(group)
    }

    /// Each member's picks and record for a week.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there is no such group.
    #[instrument(skip(self), fields(week = %week))]
    pub fn members_for_week(
        &self,
        group_id: i32,
        week: NflWeek,
    ) -> Result<MembersWeek, ServiceError> {
        self.require_group(group_id)?;

        let mut pick_counts: HashMap<i32, usize> = HashMap::new();
        for (pick, _, _) in self
            .repository
            .picks_for_week(week, WeekFilter::group(group_id))?
        {
            *pick_counts.entry(*pick.user_id()).or_default() += 1;
        }

        let records: HashMap<i32, (i32, i32, i32)> = self
            .repository
            .weekly_scores(week, Some(group_id))?
            .into_iter()
            .map(|(score, _, _)| {
                (
                    *score.user_id(),
                    (*score.wins(), *score.losses(), *score.ties()),
                )
            })
            .collect();

        let members = self
            .repository
            .list_members(group_id)?
            .into_iter()
            .map(|(_, user)| {
                let pick_count = pick_counts.get(user.id()).copied().unwrap_or(0);
                let (wins, losses, ties) = records.get(user.id()).copied().unwrap_or_default();
                MemberWeek {
                    id: *user.id(),
                    username: user.username().clone(),
                    name: user.name().clone(),
                    has_picks: pick_count > 0,
                    pick_count,
                    wins,
                    losses,
                    ties,
                }
            })
            .collect::<Vec<_>>();

        debug!(members = members.len(), "Member week assembled");
        Ok(MembersWeek { week, members })
    }
}
