//! PostgreSQL-backed `AccountRepository` and `DepartmentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, DepartmentRepository, DepartmentRepositoryError,
};
use crate::domain::{
    Account, AccountCredentials, AccountFlags, AccountProfile, Department, DepartmentId, GradYear,
    InstitutionalEmail, NewAccount, PersonName, PhoneNumber, RollNumber, UserId,
};

use super::error_mapping::{DieselFailure, account_unique_field, classify, pool_error_message};
use super::models::{DepartmentRow, NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{departments, users};

/// Diesel-backed account store.
///
/// Unique-constraint violations are translated into
/// [`AccountRepositoryError::Duplicate`] using the constraint name; deleting
/// an account that still owns questions or answers trips the `RESTRICT`
/// foreign keys and surfaces as [`AccountRepositoryError::InUse`].
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    match classify(error) {
        DieselFailure::Connection => AccountRepositoryError::connection("database connection error"),
        DieselFailure::Unique { constraint } => account_unique_field(constraint.as_deref())
            .map_or_else(
                || AccountRepositoryError::query("unique constraint violated"),
                AccountRepositoryError::duplicate,
            ),
        DieselFailure::ForeignKey { constraint } => {
            if constraint.as_deref() == Some("users_department_id_fkey") {
                AccountRepositoryError::query("unknown department")
            } else {
                AccountRepositoryError::in_use()
            }
        }
        DieselFailure::Query(message) => AccountRepositoryError::query(message),
    }
}

fn row_to_credentials(row: UserRow) -> Result<AccountCredentials, AccountRepositoryError> {
    let grad_year = GradYear::new(row.grad_year).map_err(|err| {
        warn!(user_id = %row.id, %err, "stored account has invalid graduation year");
        AccountRepositoryError::query("stored account row is invalid")
    })?;
    let account = Account {
        id: UserId::from(row.id),
        profile: AccountProfile {
            email: InstitutionalEmail::from_trusted(row.email),
            username: PersonName::from_trusted(row.username),
            first_name: PersonName::from_trusted(row.first_name),
            middle_name: row.middle_name.map(PersonName::from_trusted),
            last_name: PersonName::from_trusted(row.last_name),
            date_of_birth: row.date_of_birth,
            grad_year,
            roll_number: RollNumber::from_trusted(row.roll_number),
            phone: PhoneNumber::from_trusted(row.phone),
            department: DepartmentId::new(row.department_id),
        },
        flags: AccountFlags {
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
        },
        created_at: row.created_at,
    };
    Ok(AccountCredentials {
        account,
        password_hash: row.password_hash,
    })
}

fn profile_update<'a>(profile: &'a AccountProfile, password_hash: &'a str) -> UserProfileUpdate<'a> {
    UserProfileUpdate {
        email: profile.email.as_ref(),
        username: profile.username.as_ref(),
        first_name: profile.first_name.as_ref(),
        middle_name: profile.middle_name.as_ref().map(AsRef::as_ref),
        last_name: profile.last_name.as_ref(),
        date_of_birth: profile.date_of_birth,
        grad_year: profile.grad_year.value(),
        roll_number: profile.roll_number.as_ref(),
        phone: profile.phone.as_ref(),
        department_id: profile.department.value(),
        password_hash,
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &NewAccount) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let profile = &account.profile;
        let row = NewUserRow {
            id: *account.id.as_uuid(),
            email: profile.email.as_ref(),
            username: profile.username.as_ref(),
            first_name: profile.first_name.as_ref(),
            middle_name: profile.middle_name.as_ref().map(AsRef::as_ref),
            last_name: profile.last_name.as_ref(),
            date_of_birth: profile.date_of_birth,
            grad_year: profile.grad_year.value(),
            roll_number: profile.roll_number.as_ref(),
            phone: profile.phone.as_ref(),
            department_id: profile.department.value(),
            password_hash: &account.password_hash,
            is_active: account.flags.is_active,
            is_staff: account.flags.is_staff,
            is_superuser: account.flags.is_superuser,
            created_at: account.created_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_credentials(row).map(|creds| creds.account))
            .transpose()
    }

    async fn find_credentials(
        &self,
        roll_number: &str,
    ) -> Result<Option<AccountCredentials>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::roll_number.eq(roll_number))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_credentials).transpose()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &AccountProfile,
        password_hash: &str,
    ) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&profile_update(profile, password_hash))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn set_active(
        &self,
        roll_number: &RollNumber,
        active: bool,
    ) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated =
            diesel::update(users::table.filter(users::roll_number.eq(roll_number.as_ref())))
                .set(users::is_active.eq(active))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}

/// Diesel-backed department reference data.
#[derive(Clone)]
pub struct DieselDepartmentRepository {
    pool: DbPool,
}

impl DieselDepartmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_department_diesel_error(error: diesel::result::Error) -> DepartmentRepositoryError {
    match classify(error) {
        DieselFailure::Connection => {
            DepartmentRepositoryError::connection("database connection error")
        }
        _ => DepartmentRepositoryError::query("database error"),
    }
}

#[async_trait]
impl DepartmentRepository for DieselDepartmentRepository {
    async fn list(&self) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| DepartmentRepositoryError::connection(pool_error_message(err)))?;
        let rows: Vec<DepartmentRow> = departments::table
            .order(departments::id.asc())
            .select(DepartmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_department_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| Department {
                id: DepartmentId::new(row.id),
                code: row.code,
                name: row.name,
            })
            .collect())
    }

    async fn exists(&self, id: DepartmentId) -> Result<bool, DepartmentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| DepartmentRepositoryError::connection(pool_error_message(err)))?;
        diesel::select(diesel::dsl::exists(
            departments::table.filter(departments::id.eq(id.value())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_department_diesel_error)
    }
}
