//! OpenAPI document for the campus Q&A REST API.
//!
//! Registers every `/api/v1` handler and the health checks, the request and
//! response DTOs, and the session cookie security scheme. Swagger UI serves
//! it in debug builds and `openapi-dump` writes it out for tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::accounts::{
    AccountRequest, AccountResponse, DepartmentResponse, LoginRequest,
};
use crate::inbound::http::answers::{AnswerRequest, AnswerResponse};
use crate::inbound::http::moderation::{FlagRequest, FlagResponse, VoteRequest, VoteResponse};
use crate::inbound::http::questions::{QuestionRequest, QuestionResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus Q&A API",
        description = "Questions, answers, votes and moderation flags for a campus community.",
        license(name = "ISC", url = "https://opensource.org/license/isc-license-txt")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::list_departments,
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::get_account,
        crate::inbound::http::accounts::update_account,
        crate::inbound::http::accounts::delete_account,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::questions::list_questions,
        crate::inbound::http::questions::create_question,
        crate::inbound::http::questions::get_question,
        crate::inbound::http::questions::update_question,
        crate::inbound::http::questions::delete_question,
        crate::inbound::http::answers::list_answers,
        crate::inbound::http::answers::create_answer,
        crate::inbound::http::answers::get_answer,
        crate::inbound::http::answers::update_answer,
        crate::inbound::http::answers::delete_answer,
        crate::inbound::http::moderation::vote_question,
        crate::inbound::http::moderation::vote_answer,
        crate::inbound::http::moderation::flag_question,
        crate::inbound::http::moderation::flag_answer,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        AccountRequest,
        AccountResponse,
        DepartmentResponse,
        LoginRequest,
        QuestionRequest,
        QuestionResponse,
        AnswerRequest,
        AnswerResponse,
        VoteRequest,
        VoteResponse,
        FlagRequest,
        FlagResponse,
    )),
    tags(
        (name = "accounts", description = "Registration, sessions and self-service profiles"),
        (name = "questions", description = "Questions and their tags"),
        (name = "answers", description = "Answers nested under a question"),
        (name = "moderation", description = "Votes and flags"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).unwrap_or_else(|| panic!("{name} schema")) {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("{name} should be an object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/users/{id}")]
    #[case("/api/v1/questions/{question_id}/answers/{answer_id}")]
    #[case("/api/v1/answers/{id}/flag")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn error_schema_exposes_wire_fields() {
        let fields = object_fields("crate.domain.Error");
        for field in ["code", "message", "traceId"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[test]
    fn account_response_hides_credentials() {
        let fields = object_fields("AccountResponse");
        assert!(fields.iter().any(|f| f == "email"));
        assert!(!fields.iter().any(|f| f == "password"));
        assert!(!fields.iter().any(|f| f == "rollNumber"));
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
