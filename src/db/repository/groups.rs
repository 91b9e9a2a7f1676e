//! Groups and memberships.

use std::collections::HashMap;

use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::PoolRepository;
use crate::db::{DbError, Group, GroupMember, NewGroup, NewGroupMember, User, schema};

impl PoolRepository {
    /// Creates a group and enrols its creator as the first member.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the creator does not exist or a database error occurs.
    #[instrument(skip(self, new_group))]
    pub fn create_group(&self, new_group: NewGroup) -> Result<Group, DbError> {
        let mut conn = self.connection()?;

        let group = conn.transaction::<_, DbError, _>(|conn| {
            let group = diesel::insert_into(schema::groups::table)
                .values(&new_group)
                .returning(Group::as_returning())
                .get_result(conn)?;

            diesel::insert_into(schema::group_members::table)
                .values(&NewGroupMember::new(*group.created_by(), *group.id()))
                .execute(conn)?;

            Ok(group)
        })?;

        info!(group_id = group.id(), name = %group.name(), created_by = group.created_by(), "Group created");
        Ok(group)
    }

    /// Lists all groups with their member counts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_groups(&self) -> Result<Vec<(Group, i64)>, DbError> {
        let mut conn = self.connection()?;

        let groups = schema::groups::table
            .order((schema::groups::created_at.asc(), schema::groups::id.asc()))
            .select(Group::as_select())
            .load(&mut conn)?;

        let counts: HashMap<i32, i64> = schema::group_members::table
            .group_by(schema::group_members::group_id)
            .select((schema::group_members::group_id, count_star()))
            .load::<(i32, i64)>(&mut conn)?
            .into_iter()
            .collect();

        debug!(count = groups.len(), "Groups loaded");
        Ok(groups
            .into_iter()
            .map(|g| {
                let members = counts.get(g.id()).copied().unwrap_or(0);
                (g, members)
            })
            .collect())
    }

    /// Gets a group by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_group(&self, group_id: i32) -> Result<Option<Group>, DbError> {
        let mut conn = self.connection()?;
        let group = schema::groups::table
            .find(group_id)
            .select(Group::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(group)
    }

    /// Deletes a group; members, picks and weekly scores cascade.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_group(&self, group_id: i32) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(schema::groups::table.find(group_id)).execute(&mut conn)?;
        info!(group_id, removed, "Group deleted");
        Ok(removed)
    }

    /// Adds a user to a group.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with kind `Conflict` if the user is already a member.
    #[instrument(skip(self))]
    pub fn add_member(&self, user_id: i32, group_id: i32) -> Result<GroupMember, DbError> {
        let mut conn = self.connection()?;
        let member = diesel::insert_into(schema::group_members::table)
            .values(&NewGroupMember::new(user_id, group_id))
            .returning(GroupMember::as_returning())
            .get_result(&mut conn)?;
        info!(user_id, group_id, "Member added");
        Ok(member)
    }

    /// Whether a user belongs to a group.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn is_member(&self, user_id: i32, group_id: i32) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let member = diesel::select(exists(
            schema::group_members::table
                .filter(schema::group_members::user_id.eq(user_id))
                .filter(schema::group_members::group_id.eq(group_id)),
        ))
        .get_result(&mut conn)?;
        Ok(member)
    }

    /// Lists a group's members in join order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_members(&self, group_id: i32) -> Result<Vec<(GroupMember, User)>, DbError> {
        let mut conn = self.connection()?;
        let members = schema::group_members::table
            .inner_join(schema::users::table)
            .filter(schema::group_members::group_id.eq(group_id))
            .order((
                schema::group_members::joined_at.asc(),
                schema::group_members::id.asc(),
            ))
            .select((GroupMember::as_select(), User::as_select()))
            .load(&mut conn)?;
        debug!(group_id, count = members.len(), "Members loaded");
        Ok(members)
    }
}
