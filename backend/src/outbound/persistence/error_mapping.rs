//! Shared classification of pool and Diesel failures.
//!
//! Each repository maps a [`DieselFailure`] onto its own port error, so the
//! logging and constraint inspection live in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse outcome of a failed Diesel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-query.
    Connection,
    /// A unique constraint was violated; carries the constraint name if the
    /// server reported one.
    Unique { constraint: Option<String> },
    /// A foreign key blocked the write or delete.
    ForeignKey { constraint: Option<String> },
    /// Anything else; the message is safe to log but not to return.
    Query(&'static str),
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error and emit debug context for it.
pub(crate) fn classify(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::ClosedConnection => DieselFailure::Connection,
                DatabaseErrorKind::UniqueViolation => DieselFailure::Unique { constraint },
                DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKey { constraint },
                _ => DieselFailure::Query("database error"),
            }
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Account field guarded by a `users_*_key` unique constraint.
pub(crate) fn account_unique_field(constraint: Option<&str>) -> Option<&'static str> {
    match constraint? {
        "users_email_key" => Some("email"),
        "users_username_key" => Some("username"),
        "users_roll_number_key" => Some("rollNumber"),
        "users_phone_key" => Some("phone"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("users_email_key"), Some("email"))]
    #[case(Some("users_roll_number_key"), Some("rollNumber"))]
    #[case(Some("users_phone_key"), Some("phone"))]
    #[case(Some("users_pkey"), None)]
    #[case(None, None)]
    fn unique_constraints_name_account_fields(
        #[case] constraint: Option<&str>,
        #[case] expected: Option<&'static str>,
    ) {
        assert_eq!(account_unique_field(constraint), expected);
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify(DieselError::NotFound),
            DieselFailure::Query("record not found")
        );
    }

    #[rstest]
    fn pool_messages_are_preserved() {
        assert_eq!(
            pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
    }
}
