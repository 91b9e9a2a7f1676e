//! Service error type.

use tracing::instrument;

use crate::db::DbError;

/// Error raised by the service layer.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ServiceError {
    /// Input failed validation.
    #[display("{}", _0)]
    Validation(String),

    /// Missing or bad credentials.
    #[display("{}", _0)]
    Unauthorized(String),

    /// Authenticated, but not allowed.
    #[display("{}", _0)]
    Forbidden(String),

    /// A referenced entity does not exist.
    #[display("{}", _0)]
    NotFound(String),

    /// The write collides with existing state.
    #[display("{}", _0)]
    Conflict(String),

    /// Picks were submitted for games that have kicked off.
    #[display("Cannot make picks for games that have already started")]
    GamesLocked(Vec<i32>),

    /// Picks referenced games that do not exist.
    #[display("Some games not found")]
    GamesMissing(Vec<i32>),

    /// Unexpected failure outside the database, e.g. password hashing.
    #[display("{}", _0)]
    Internal(String),

    /// Database failure.
    #[display("{}", _0)]
    Database(DbError),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Shorthand for a validation failure.
    #[instrument(skip(message))]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a missing entity.
    #[instrument(skip(message))]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        Self::Database(err)
    }
}
