//! Shared validation helpers for inbound HTTP adapters.
//!
//! Only transport-level shapes are checked here (path identifiers, enum
//! spellings and JSON bodies). Field rules live in the domain.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::domain::{Error, Scope};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidScope,
    MalformedBody,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidScope => "invalid_scope",
            Self::MalformedBody => "malformed_body",
            Self::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn rejected_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        rejected_value(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

/// Parse an optional scope; absent means "use the default".
pub(crate) fn parse_scope(value: Option<&str>) -> Result<Option<Scope>, Error> {
    let Some(raw) = value else {
        return Ok(None);
    };
    Scope::parse(raw).map(Some).ok_or_else(|| {
        rejected_value(
            FieldName::new("scope"),
            ErrorCode::InvalidScope,
            "scope must be one of branch_grad_year, grad_year, college".to_owned(),
            raw,
        )
    })
}

/// Deserialize a JSON request body.
///
/// Bodies are read as raw bytes and parsed only once the handler has checked
/// the session, so anonymous callers see `403` whatever they send. Failures
/// become `invalid_request` errors; a body that parses as an object but
/// carries a badly typed member names that member in `details.field`.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|err| {
        if err.is_data() {
            if let Some(field) = offending_field::<T>(body) {
                return Error::invalid_request(format!("{field} has an invalid value"))
                    .with_details(json!({
                        "field": field,
                        "code": ErrorCode::InvalidField.as_str(),
                        "reason": err.to_string(),
                    }));
            }
        }
        Error::invalid_request("request body must be a JSON object").with_details(json!({
            "code": ErrorCode::MalformedBody.as_str(),
            "reason": err.to_string(),
        }))
    })
}

/// First top-level member that fails to deserialize on its own.
///
/// Request bodies default every member, so a single-member object isolates
/// the one that is wrong.
fn offending_field<T: DeserializeOwned>(body: &[u8]) -> Option<String> {
    let Ok(Value::Object(members)) = serde_json::from_slice::<Value>(body) else {
        return None;
    };
    members.into_iter().find_map(|(name, value)| {
        let mut single = Map::new();
        single.insert(name.clone(), value);
        serde_json::from_value::<T>(Value::Object(single))
            .is_err()
            .then_some(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    #[rstest]
    fn parse_uuid_reports_field_and_value() {
        let err = parse_uuid("nope", FieldName::new("questionId")).expect_err("invalid");

        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["field"], "questionId");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("college"), Some(Scope::College))]
    #[case(Some("grad_year"), Some(Scope::GradYear))]
    #[case(Some("branch_grad_year"), Some(Scope::BranchGradYear))]
    fn parse_scope_accepts_known_values(
        #[case] raw: Option<&str>,
        #[case] expected: Option<Scope>,
    ) {
        assert_eq!(parse_scope(raw).expect("valid scope"), expected);
    }

    #[rstest]
    fn parse_scope_rejects_unknown_values() {
        let err = parse_scope(Some("campus")).expect_err("invalid");
        let details = err.details().expect("details present");
        assert_eq!(details["code"], "invalid_scope");
    }

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    struct Enrolment {
        grad_year: Option<i32>,
        nickname: Option<String>,
    }

    #[rstest]
    fn parse_json_body_accepts_partial_objects() {
        let parsed: Enrolment = parse_json_body(br#"{"gradYear":2024}"#).expect("valid body");
        assert_eq!(parsed.grad_year, Some(2024));
        assert_eq!(parsed.nickname, None);
    }

    #[rstest]
    fn parse_json_body_names_badly_typed_member() {
        let err = parse_json_body::<Enrolment>(br#"{"nickname":"ada","gradYear":"2022"}"#)
            .expect_err("wrong type");

        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["field"], "gradYear");
        assert_eq!(details["code"], "invalid_field");
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"{not json".as_slice())]
    #[case(b"[1, 2]".as_slice())]
    fn parse_json_body_rejects_malformed_bodies(#[case] body: &[u8]) {
        let err = parse_json_body::<Enrolment>(body).expect_err("malformed");

        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["code"], "malformed_body");
        assert!(details.get("field").is_none());
    }
}
