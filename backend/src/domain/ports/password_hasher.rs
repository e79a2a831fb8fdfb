//! Port for password hashing.

use async_trait::async_trait;

use crate::domain::Password;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce an encoded hash including algorithm parameters and salt.
    async fn hash(&self, password: &Password) -> Result<String, PasswordHashError>;

    /// Check a candidate password against an encoded hash.
    async fn verify(&self, candidate: &str, encoded: &str) -> Result<bool, PasswordHashError>;
}
