//! Password hashing for accounts and group join passwords.

use tracing::{instrument, warn};

use super::ServiceError;

/// bcrypt hasher with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// Creates a hasher. Costs below bcrypt's minimum are raised to it.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.max(4),
        }
    }

    /// Hashes a secret.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if bcrypt fails.
    #[instrument(skip(self, secret))]
    pub fn hash(&self, secret: &str) -> Result<String, ServiceError> {
        bcrypt::hash(secret, self.cost)
            .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Checks a secret against a stored hash. A malformed hash never matches.
    #[instrument(skip(self, secret, hash))]
    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        match bcrypt::verify(secret, hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }
}
