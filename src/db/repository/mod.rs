//! Database repository for the pick'em pool.
//!
//! Every public method opens its own connection; operations that touch more
//! than one row run inside a single transaction.

mod games;
mod groups;
mod picks;
mod scores;
mod users;

pub use scores::WeekRegrade;

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::DbError;
use crate::schedule::NflWeek;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Optional narrowing of week-scoped queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekFilter {
    /// Restrict to one group.
    pub group_id: Option<i32>,
    /// Restrict to one user.
    pub user_id: Option<i32>,
}

impl WeekFilter {
    /// Filter to a single group.
    pub fn group(group_id: i32) -> Self {
        Self {
            group_id: Some(group_id),
            user_id: None,
        }
    }
}

/// Database repository for pool operations.
#[derive(Debug, Clone)]
pub struct PoolRepository {
    database_url: String,
}

impl PoolRepository {
    /// Creates a new repository for the SQLite database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(database_url), fields(database_url = %database_url))]
    pub fn new(database_url: String) -> Result<Self, DbError> {
        if database_url.trim().is_empty() {
            return Err(DbError::new("Database URL is empty"));
        }
        info!(path = %database_url, "Creating PoolRepository");
        Ok(Self { database_url })
    }

    /// Path of the backing database.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Establishes a database connection with foreign keys enforced.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.database_url, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.database_url).map_err(|e| {
            DbError::new(format!(
                "Failed to connect to '{}': {}",
                self.database_url, e
            ))
        })?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        diesel::sql_query("PRAGMA busy_timeout = 5000").execute(&mut conn)?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Cheap round trip used by the health check.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be reached.
    #[instrument(skip(self))]
    pub fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}

/// `(season, week)` pair as stored in the database.
pub(crate) fn week_key(week: NflWeek) -> (i32, i32) {
    (*week.season(), *week.week())
}
