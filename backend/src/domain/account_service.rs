//! Account directory service.
//!
//! Implements registration, self-service profile management, login and the
//! administrative toggles on top of the account, department and hashing
//! ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{
    AccountAdministration, AccountCommand, AccountQuery, AccountRepository, DepartmentRepository,
    LoginService, PasswordHasher, RegisterAccountRequest,
};
use crate::domain::repository_errors::{
    map_account_error, map_department_error, map_hash_error,
};
use crate::domain::{
    Account, AccountField, AccountFlags, AccountProfile, AccountValidationError, Action,
    Department, EmailPolicy, Error, LoginCredentials, NewAccount, Password, Resource,
    RollNumber, UserId, authorize,
};

/// Account directory implementing every account driving port.
#[derive(Clone)]
pub struct AccountService<A, D, H> {
    accounts: Arc<A>,
    departments: Arc<D>,
    hasher: Arc<H>,
    email_policy: EmailPolicy,
    clock: Arc<dyn Clock>,
}

impl<A, D, H> AccountService<A, D, H> {
    /// Create a new service with the given adapters.
    pub fn new(
        accounts: Arc<A>,
        departments: Arc<D>,
        hasher: Arc<H>,
        email_policy: EmailPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            departments,
            hasher,
            email_policy,
            clock,
        }
    }
}

fn validation_error(error: &AccountValidationError) -> Error {
    let mut details = json!({ "code": error.code() });
    if let Some(field) = error.field() {
        details["field"] = json!(field.as_str());
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

impl<A, D, H> AccountService<A, D, H>
where
    A: AccountRepository,
    D: DepartmentRepository,
    H: PasswordHasher,
{
    /// Validate the payload, check the department, and hash the password.
    async fn prepare(
        &self,
        request: RegisterAccountRequest,
    ) -> Result<(AccountProfile, String), Error> {
        let RegisterAccountRequest { input, password } = request;
        let profile = AccountProfile::try_from_input(input, &self.email_policy)
            .map_err(|err| validation_error(&err))?;
        let password = password
            .ok_or(AccountValidationError::Missing {
                field: AccountField::Password,
            })
            .and_then(|raw| {
                Password::new(raw).map_err(|_| AccountValidationError::Blank {
                    field: AccountField::Password,
                })
            })
            .map_err(|err| validation_error(&err))?;

        let known = self
            .departments
            .exists(profile.department)
            .await
            .map_err(map_department_error)?;
        if !known {
            return Err(Error::invalid_request("unknown department").with_details(json!({
                "field": AccountField::Department.as_str(),
                "code": "unknown_department",
            })));
        }

        let hash = self
            .hasher
            .hash(&password)
            .await
            .map_err(map_hash_error)?;
        Ok((profile, hash))
    }

    async fn create(
        &self,
        request: RegisterAccountRequest,
        flags: AccountFlags,
    ) -> Result<Account, Error> {
        let (profile, password_hash) = self.prepare(request).await?;
        let account = NewAccount {
            id: UserId::random(),
            profile,
            password_hash,
            flags,
            created_at: self.clock.utc(),
        };
        self.accounts
            .insert(&account)
            .await
            .map_err(map_account_error)?;

        let NewAccount {
            id,
            profile,
            flags,
            created_at,
            ..
        } = account;
        Ok(Account {
            id,
            profile,
            flags,
            created_at,
        })
    }

    async fn load(&self, id: &UserId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }
}

#[async_trait]
impl<A, D, H> AccountCommand for AccountService<A, D, H>
where
    A: AccountRepository,
    D: DepartmentRepository,
    H: PasswordHasher,
{
    async fn register(&self, request: RegisterAccountRequest) -> Result<Account, Error> {
        self.create(request, AccountFlags::regular()).await
    }

    async fn update(
        &self,
        actor: &UserId,
        id: &UserId,
        request: RegisterAccountRequest,
    ) -> Result<Account, Error> {
        authorize(*actor, Resource::Account { id: *id }, Action::Update)
            .require("accounts can only be modified by their owner")?;
        let (profile, password_hash) = self.prepare(request).await?;
        let updated = self
            .accounts
            .update_profile(id, &profile, &password_hash)
            .await
            .map_err(map_account_error)?;
        if !updated {
            return Err(Error::not_found("account not found"));
        }
        self.load(id).await
    }

    async fn delete(&self, actor: &UserId, id: &UserId) -> Result<(), Error> {
        authorize(*actor, Resource::Account { id: *id }, Action::Delete)
            .require("accounts can only be deleted by their owner")?;
        let deleted = self
            .accounts
            .delete(id)
            .await
            .map_err(map_account_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found("account not found"))
        }
    }
}

#[async_trait]
impl<A, D, H> AccountQuery for AccountService<A, D, H>
where
    A: AccountRepository,
    D: DepartmentRepository,
    H: PasswordHasher,
{
    async fn get(&self, actor: &UserId, id: &UserId) -> Result<Account, Error> {
        authorize(*actor, Resource::Account { id: *id }, Action::Read)
            .require("accounts can only be viewed by their owner")?;
        self.load(id).await
    }

    async fn departments(&self) -> Result<Vec<Department>, Error> {
        self.departments.list().await.map_err(map_department_error)
    }
}

#[async_trait]
impl<A, D, H> LoginService for AccountService<A, D, H>
where
    A: AccountRepository,
    D: DepartmentRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(stored) = self
            .accounts
            .find_credentials(credentials.roll_number())
            .await
            .map_err(map_account_error)?
        else {
            debug!("login rejected: unknown roll number");
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            debug!(user_id = %stored.account.id, "login rejected: password mismatch");
            return Err(invalid_credentials());
        }
        if !stored.account.flags.is_active {
            debug!(user_id = %stored.account.id, "login rejected: account inactive");
            return Err(invalid_credentials());
        }
        Ok(stored.account.id)
    }

    async fn confirm_active(&self, id: &UserId) -> Result<(), Error> {
        let account = self.accounts.find_by_id(id).await.map_err(map_account_error)?;
        match account {
            Some(account) if account.flags.is_active => Ok(()),
            Some(_) => {
                debug!(user_id = %id, "session rejected: account inactive");
                Err(Error::unauthorized("login required"))
            }
            None => {
                debug!(user_id = %id, "session rejected: account removed");
                Err(Error::unauthorized("login required"))
            }
        }
    }
}

#[async_trait]
impl<A, D, H> AccountAdministration for AccountService<A, D, H>
where
    A: AccountRepository,
    D: DepartmentRepository,
    H: PasswordHasher,
{
    async fn create_superuser(
        &self,
        request: RegisterAccountRequest,
        is_staff: bool,
    ) -> Result<Account, Error> {
        let flags = AccountFlags::superuser(is_staff).map_err(|err| validation_error(&err))?;
        self.create(request, flags).await
    }

    async fn set_active(&self, roll_number: &str, active: bool) -> Result<(), Error> {
        let roll_number = RollNumber::new(roll_number).map_err(|err| validation_error(&err))?;
        let found = self
            .accounts
            .set_active(&roll_number, active)
            .await
            .map_err(map_account_error)?;
        if found {
            Ok(())
        } else {
            Err(Error::not_found(format!(
                "no account with roll number {roll_number}"
            )))
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
