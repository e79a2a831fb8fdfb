//! Translation of driven-port failures into domain errors.
//!
//! Connection failures become `service_unavailable`, query failures become
//! `internal_error`; domain-meaningful variants are handled by the calling
//! service before it falls back to these helpers.

use serde_json::json;

use super::Error;
use super::ports::{
    AccountRepositoryError, AnswerRepositoryError, DepartmentRepositoryError,
    PasswordHashError, QuestionRepositoryError,
};

pub(crate) fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::Duplicate { field } => {
            Error::conflict(format!("an account with this {field} already exists"))
                .with_details(json!({ "field": field, "code": "duplicate" }))
        }
        AccountRepositoryError::InUse => {
            Error::conflict("account still owns questions or answers")
                .with_details(json!({ "code": "account_in_use" }))
        }
    }
}

pub(crate) fn map_department_error(error: DepartmentRepositoryError) -> Error {
    match error {
        DepartmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("department repository unavailable: {message}"))
        }
        DepartmentRepositoryError::Query { message } => {
            Error::internal(format!("department repository error: {message}"))
        }
    }
}

pub(crate) fn map_question_error(error: QuestionRepositoryError) -> Error {
    match error {
        QuestionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("question repository unavailable: {message}"))
        }
        QuestionRepositoryError::Query { message } => {
            Error::internal(format!("question repository error: {message}"))
        }
    }
}

pub(crate) fn map_answer_error(error: AnswerRepositoryError) -> Error {
    match error {
        AnswerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("answer repository unavailable: {message}"))
        }
        AnswerRepositoryError::Query { message } => {
            Error::internal(format!("answer repository error: {message}"))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}
