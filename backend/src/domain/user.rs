//! Account data model and registration validation.
//!
//! Raw registration input is converted into an [`AccountProfile`] through
//! [`AccountProfile::try_from_input`], which reports the first failing field.
//! Persistence only ever sees validated values.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DepartmentId;

/// Default institutional email pattern.
pub const DEFAULT_EMAIL_PATTERN: &str = r"^\d{4}-\d{2}-\d{3}-\d{3}@vce\.ac\.in$";
/// Maximum length of usernames and personal names.
pub const NAME_MAX: usize = 150;

/// Registration field names as they appear in request payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountField {
    Email,
    Username,
    FirstName,
    MiddleName,
    LastName,
    DateOfBirth,
    GradYear,
    RollNumber,
    Phone,
    Department,
    Password,
}

impl AccountField {
    /// camelCase name used in payloads and error details.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::FirstName => "firstName",
            Self::MiddleName => "middleName",
            Self::LastName => "lastName",
            Self::DateOfBirth => "dateOfBirth",
            Self::GradYear => "gradYear",
            Self::RollNumber => "rollNumber",
            Self::Phone => "phone",
            Self::Department => "department",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors returned while building account values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    Missing { field: AccountField },
    Blank { field: AccountField },
    TooLong { field: AccountField, max: usize },
    InvalidEmail,
    InvalidRollNumber,
    InvalidPhone,
    InvalidGradYear,
    InvalidDateOfBirth,
    InvalidUserId,
    SuperuserRequiresStaff,
}

impl AccountValidationError {
    /// Field the error refers to, if any.
    pub fn field(&self) -> Option<AccountField> {
        match self {
            Self::Missing { field } | Self::Blank { field } | Self::TooLong { field, .. } => {
                Some(*field)
            }
            Self::InvalidEmail => Some(AccountField::Email),
            Self::InvalidRollNumber => Some(AccountField::RollNumber),
            Self::InvalidPhone => Some(AccountField::Phone),
            Self::InvalidGradYear => Some(AccountField::GradYear),
            Self::InvalidDateOfBirth => Some(AccountField::DateOfBirth),
            Self::InvalidUserId | Self::SuperuserRequiresStaff => None,
        }
    }

    /// Stable snake_case code for error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing_field",
            Self::Blank { .. } => "blank_field",
            Self::TooLong { .. } => "field_too_long",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidRollNumber => "invalid_roll_number",
            Self::InvalidPhone => "invalid_phone",
            Self::InvalidGradYear => "invalid_grad_year",
            Self::InvalidDateOfBirth => "invalid_date_of_birth",
            Self::InvalidUserId => "invalid_user_id",
            Self::SuperuserRequiresStaff => "superuser_requires_staff",
        }
    }
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "missing required field: {field}"),
            Self::Blank { field } => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "email must be an institutional address"),
            Self::InvalidRollNumber => {
                write!(f, "roll number must look like 1602-YY-7BB-NNN")
            }
            Self::InvalidPhone => write!(f, "phone must be exactly 10 digits"),
            Self::InvalidGradYear => {
                write!(f, "graduation year must be four digits starting with 2")
            }
            Self::InvalidDateOfBirth => write!(f, "date of birth must be a YYYY-MM-DD date"),
            Self::InvalidUserId => write!(f, "user id must be a valid UUID"),
            Self::SuperuserRequiresStaff => write!(f, "superuser must have is_staff=true"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual UUID form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(AccountValidationError::InvalidUserId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidUserId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("built-in regex failed to compile: {error}"))
}

static ROLL_NUMBER_RE: OnceLock<Regex> = OnceLock::new();

fn roll_number_regex() -> &'static Regex {
    ROLL_NUMBER_RE.get_or_init(|| compile(r"^1602-\d{2}-7\d{2}-\d{3}$"))
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl $name {
            /// Rehydrate a stored value without re-validation.
            pub fn from_trusted(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }
        }
    };
}

string_newtype! {
    /// Institutional email address with a lower-cased domain part.
    InstitutionalEmail
}

string_newtype! {
    /// Roll number (hall-ticket number), the login identifier.
    RollNumber
}

string_newtype! {
    /// Ten-digit phone number.
    PhoneNumber
}

string_newtype! {
    /// Non-blank name of at most [`NAME_MAX`] characters.
    PersonName
}

impl RollNumber {
    /// Validate a roll number against the institutional format.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if !roll_number_regex().is_match(trimmed) {
            return Err(AccountValidationError::InvalidRollNumber);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl PhoneNumber {
    /// Validate a phone number of exactly ten ASCII digits.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.len() != 10 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AccountValidationError::InvalidPhone);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl PersonName {
    /// Validate a name for the given field.
    pub fn new(field: AccountField, raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::Blank { field });
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(AccountValidationError::TooLong {
                field,
                max: NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Institutional email policy compiled from configuration.
///
/// # Examples
/// ```
/// use campus_qa::domain::EmailPolicy;
///
/// let policy = EmailPolicy::default();
/// assert!(policy.parse("1602-18-733-010@VCE.ac.in").is_ok());
/// assert!(policy.parse("foo@vce.ac.in").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EmailPolicy {
    pattern: Regex,
}

impl EmailPolicy {
    /// Compile a policy from a regular expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Normalise and validate an email address.
    ///
    /// The domain part is lower-cased before matching; the local part is kept
    /// as given.
    pub fn parse(&self, raw: &str) -> Result<InstitutionalEmail, AccountValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::Blank {
                field: AccountField::Email,
            });
        }
        let normalised = match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
            None => return Err(AccountValidationError::InvalidEmail),
        };
        if !self.pattern.is_match(&normalised) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(InstitutionalEmail(normalised))
    }
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self {
            pattern: compile(DEFAULT_EMAIL_PATTERN),
        }
    }
}

/// Graduation year: four digits starting with `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradYear(i32);

impl GradYear {
    pub fn new(year: i32) -> Result<Self, AccountValidationError> {
        if (2000..=2999).contains(&year) {
            Ok(Self(year))
        } else {
            Err(AccountValidationError::InvalidGradYear)
        }
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

/// Raw registration payload before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub grad_year: Option<i32>,
    pub roll_number: Option<String>,
    pub phone: Option<String>,
    pub department: Option<i32>,
}

/// Validated identity fields of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub email: InstitutionalEmail,
    pub username: PersonName,
    pub first_name: PersonName,
    pub middle_name: Option<PersonName>,
    pub last_name: PersonName,
    pub date_of_birth: NaiveDate,
    pub grad_year: GradYear,
    pub roll_number: RollNumber,
    pub phone: PhoneNumber,
    pub department: DepartmentId,
}

fn required<T>(value: Option<T>, field: AccountField) -> Result<T, AccountValidationError> {
    value.ok_or(AccountValidationError::Missing { field })
}

impl AccountProfile {
    /// Validate every registration field, failing on the first invalid one.
    ///
    /// Department existence is checked by the account service, not here.
    pub fn try_from_input(
        input: RegistrationInput,
        policy: &EmailPolicy,
    ) -> Result<Self, AccountValidationError> {
        let RegistrationInput {
            email,
            username,
            first_name,
            middle_name,
            last_name,
            date_of_birth,
            grad_year,
            roll_number,
            phone,
            department,
        } = input;

        let email = policy.parse(&required(email, AccountField::Email)?)?;
        let username = PersonName::new(
            AccountField::Username,
            required(username, AccountField::Username)?,
        )?;
        let first_name = PersonName::new(
            AccountField::FirstName,
            required(first_name, AccountField::FirstName)?,
        )?;
        let middle_name = middle_name
            .filter(|name| !name.trim().is_empty())
            .map(|name| PersonName::new(AccountField::MiddleName, name))
            .transpose()?;
        let last_name = PersonName::new(
            AccountField::LastName,
            required(last_name, AccountField::LastName)?,
        )?;
        let date_of_birth = NaiveDate::parse_from_str(
            required(date_of_birth, AccountField::DateOfBirth)?.trim(),
            "%Y-%m-%d",
        )
        .map_err(|_| AccountValidationError::InvalidDateOfBirth)?;
        let grad_year = GradYear::new(required(grad_year, AccountField::GradYear)?)?;
        let roll_number = RollNumber::new(required(roll_number, AccountField::RollNumber)?)?;
        let phone = PhoneNumber::new(required(phone, AccountField::Phone)?)?;
        let department = DepartmentId::new(required(department, AccountField::Department)?);

        Ok(Self {
            email,
            username,
            first_name,
            middle_name,
            last_name,
            date_of_birth,
            grad_year,
            roll_number,
            phone,
            department,
        })
    }
}

/// Privilege and activation flags of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountFlags {
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl AccountFlags {
    /// Flags for a freshly registered student: inactive and unprivileged.
    pub fn regular() -> Self {
        Self::default()
    }

    /// Flags for an administrator.
    ///
    /// Fails unless `is_staff` is requested.
    pub fn superuser(is_staff: bool) -> Result<Self, AccountValidationError> {
        if !is_staff {
            return Err(AccountValidationError::SuperuserRequiresStaff);
        }
        Ok(Self {
            is_active: true,
            is_staff: true,
            is_superuser: true,
        })
    }
}

/// Account ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub id: UserId,
    pub profile: AccountProfile,
    pub password_hash: String,
    pub flags: AccountFlags,
    pub created_at: DateTime<Utc>,
}

/// Persisted account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    pub profile: AccountProfile,
    pub flags: AccountFlags,
    pub created_at: DateTime<Utc>,
}

/// Account together with its stored password hash, for authentication only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub account: Account,
    pub password_hash: String,
}

#[cfg(test)]
mod tests;
