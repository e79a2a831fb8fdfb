//! Driving ports for account use cases.
//!
//! Inbound adapters register, update and remove accounts through
//! [`AccountCommand`], read them through [`AccountQuery`], and authenticate
//! through [`LoginService`]. The admin CLI uses [`AccountAdministration`].

use async_trait::async_trait;

use crate::domain::{Account, Department, Error, LoginCredentials, RegistrationInput, UserId};

/// Registration or full-replacement payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterAccountRequest {
    pub input: RegistrationInput,
    pub password: Option<String>,
}

/// Write-side account use cases.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register a new, inactive account.
    async fn register(&self, request: RegisterAccountRequest) -> Result<Account, Error>;

    /// Replace the profile of `id`. Only the owner may do this.
    async fn update(
        &self,
        actor: &UserId,
        id: &UserId,
        request: RegisterAccountRequest,
    ) -> Result<Account, Error>;

    /// Delete `id`. Only the owner may do this.
    async fn delete(&self, actor: &UserId, id: &UserId) -> Result<(), Error>;
}

/// Read-side account use cases.
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Fetch `id`. Only the owner may do this.
    async fn get(&self, actor: &UserId, id: &UserId) -> Result<Account, Error>;

    /// Public department listing.
    async fn departments(&self) -> Result<Vec<Department>, Error>;
}

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown roll numbers, wrong passwords and inactive accounts all fail
    /// with the same `unauthorized` error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;

    /// Confirm a session's account still exists and is active.
    ///
    /// Deleted and deactivated accounts fail with `unauthorized`.
    async fn confirm_active(&self, id: &UserId) -> Result<(), Error>;
}

/// Out-of-band administrative operations.
#[async_trait]
pub trait AccountAdministration: Send + Sync {
    /// Create an active staff superuser. Fails when `is_staff` is false.
    async fn create_superuser(
        &self,
        request: RegisterAccountRequest,
        is_staff: bool,
    ) -> Result<Account, Error>;

    /// Activate or deactivate the account with this roll number.
    async fn set_active(&self, roll_number: &str, active: bool) -> Result<(), Error>;
}
