//! Users and sessions.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::PoolRepository;
use crate::db::{DbError, NewSession, NewUser, Session, User, schema};

impl PoolRepository {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with kind `Conflict` if the username is taken.
    #[instrument(skip(self, new_user))]
    pub fn create_user(&self, new_user: NewUser) -> Result<User, DbError> {
        let mut conn = self.connection()?;

        let user = diesel::insert_into(schema::users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), username = %user.username(), "User created");
        Ok(user)
    }

    /// Gets a user by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user(&self, user_id: i32) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    /// Gets a user by username. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        debug!(username = %username, "Looking up user by username");
        let mut conn = self.connection()?;

        let user = schema::users::table
            .filter(schema::users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        if user.is_none() {
            debug!("User not found");
        }
        Ok(user)
    }

    /// Stores a new session token for a user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the user does not exist or the token collides.
    #[instrument(skip(self, session))]
    pub fn create_session(&self, session: NewSession) -> Result<Session, DbError> {
        let mut conn = self.connection()?;
        let session = diesel::insert_into(schema::sessions::table)
            .values(&session)
            .returning(Session::as_returning())
            .get_result(&mut conn)?;
        debug!(session_id = session.id(), user_id = session.user_id(), "Session created");
        Ok(session)
    }

    /// Resolves a session token to its user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, token))]
    pub fn user_for_token(&self, token: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::sessions::table
            .inner_join(schema::users::table)
            .filter(schema::sessions::token.eq(token))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(user)
    }

    /// Deletes a session. Returns the number of sessions removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, token))]
    pub fn delete_session(&self, token: &str) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(
            schema::sessions::table.filter(schema::sessions::token.eq(token)),
        )
        .execute(&mut conn)?;
        debug!(removed, "Session deleted");
        Ok(removed)
    }
}
