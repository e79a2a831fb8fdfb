//! Port for account persistence.
//!
//! Uniqueness of email, username, roll number and phone is enforced by the
//! adapter; violations surface as [`AccountRepositoryError::Duplicate`]
//! naming the offending field so the domain can report it.

use async_trait::async_trait;

use crate::domain::{
    Account, AccountCredentials, AccountProfile, NewAccount, RollNumber, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
        /// A unique field collides with an existing account.
        Duplicate { field: String } =>
            "an account with this {field} already exists",
        /// The account still owns questions or answers.
        InUse =>
            "account still owns content",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, account: &NewAccount) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account and its password hash by roll number.
    async fn find_credentials(
        &self,
        roll_number: &str,
    ) -> Result<Option<AccountCredentials>, AccountRepositoryError>;

    /// Replace the profile fields and password hash. Returns `false` when the
    /// account does not exist.
    async fn update_profile(
        &self,
        id: &UserId,
        profile: &AccountProfile,
        password_hash: &str,
    ) -> Result<bool, AccountRepositoryError>;

    /// Remove an account. Returns `false` when the account does not exist.
    async fn delete(&self, id: &UserId) -> Result<bool, AccountRepositoryError>;

    /// Toggle `is_active`. Returns `false` when no account has this roll
    /// number.
    async fn set_active(
        &self,
        roll_number: &RollNumber,
        active: bool,
    ) -> Result<bool, AccountRepositoryError>;
}
