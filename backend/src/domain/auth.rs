//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Roll number was missing or blank once trimmed.
    EmptyRollNumber,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRollNumber => write!(f, "roll number must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `roll_number` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use campus_qa::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" 1602-18-733-010 ", "pw").unwrap();
/// assert_eq!(creds.roll_number(), "1602-18-733-010");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    roll_number: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw roll number/password inputs.
    pub fn try_from_parts(roll_number: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = roll_number.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyRollNumber);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            roll_number: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Roll number used for the account lookup.
    pub fn roll_number(&self) -> &str {
        self.roll_number.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Plain-text password held only until it is hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept any non-empty password.
    pub fn new(raw: impl Into<String>) -> Result<Self, LoginValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}
