//! Accounts and sign-in sessions.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{PasswordHasher, ServiceError};
use crate::db::{NewSession, NewUser, PoolRepository, PublicUser, User};

/// Shortest accepted username.
const MIN_USERNAME_LEN: usize = 3;
/// Shortest accepted password.
const MIN_PASSWORD_LEN: usize = 6;

/// Sign-up form.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Chosen password.
    pub password: String,
    /// Must equal `password`.
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

/// Sign-in form.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// A signed-in user and the bearer token identifying the session.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The user.
    pub user: PublicUser,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Account and session operations.
#[derive(Debug, Clone)]
pub struct AuthService {
    repository: PoolRepository,
    hasher: PasswordHasher,
}

impl AuthService {
    /// Creates an auth service.
    #[instrument(skip(repository))]
    pub fn new(repository: PoolRepository, hasher: PasswordHasher) -> Self {
        info!("Creating AuthService");
        Self { repository, hasher }
    }

    /// Registers a user and signs them in.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] if a field is missing, the passwords
    ///   differ, or a length rule is broken
    /// - [`ServiceError::Conflict`] if the username is taken
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub fn sign_up(&self, request: SignUpRequest) -> Result<AuthSession, ServiceError> {
        let username = request.username.trim();
        let name = request.name.trim();

        if username.is_empty()
            || name.is_empty()
            || request.password.is_empty()
            || request.confirm_password.is_empty()
        {
            return Err(ServiceError::validation("All fields are required"));
        }
        if request.password != request.confirm_password {
            return Err(ServiceError::validation("Passwords do not match"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(ServiceError::validation(format!(
                "Username must be at least {} characters long",
                MIN_USERNAME_LEN
            )));
        }

        if self.repository.get_user_by_username(username)?.is_some() {
            debug!("Username already registered");
            return Err(ServiceError::Conflict("Username already exists".to_string()));
        }

        let hash = self.hasher.hash(&request.password)?;
        let user = self
            .repository
            .create_user(NewUser::new(username.to_string(), name.to_string(), hash))
            .map_err(|e| {
                if e.is_conflict() {
                    ServiceError::Conflict("Username already exists".to_string())
                } else {
                    e.into()
                }
            })?;

        self.open_session(&user)
    }

    /// Checks credentials and opens a session.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] if either field is blank
    /// - [`ServiceError::Unauthorized`] if the credentials do not match
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub fn sign_in(&self, request: SignInRequest) -> Result<AuthSession, ServiceError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(ServiceError::validation(
                "Username and password are required",
            ));
        }

        let invalid = || ServiceError::Unauthorized("Invalid username or password".to_string());
        let user = self
            .repository
            .get_user_by_username(username)?
            .ok_or_else(invalid)?;

        if !self.hasher.verify(&request.password, user.password_hash()) {
            warn!(user_id = user.id(), "Password mismatch");
            return Err(invalid());
        }

        self.open_session(&user)
    }

    /// Resolves a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] if the token is unknown.
    #[instrument(skip(self, token))]
    pub fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        self.repository
            .user_for_token(token)?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid or expired session".to_string()))
    }

    /// Ends a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] if the delete fails.
    #[instrument(skip(self, token))]
    pub fn sign_out(&self, token: &str) -> Result<(), ServiceError> {
        let removed = self.repository.delete_session(token)?;
        info!(removed, "Signed out");
        Ok(())
    }

    fn open_session(&self, user: &User) -> Result<AuthSession, ServiceError> {
        let token = uuid::Uuid::new_v4().to_string();
        self.repository
            .create_session(NewSession::new(token.clone(), *user.id()))?;
        info!(user_id = user.id(), "Session opened");
        Ok(AuthSession {
            user: PublicUser::from(user),
            token,
        })
    }
}
