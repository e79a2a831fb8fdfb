//! Vote and flag handlers for questions and answers.
//!
//! ```text
//! POST /api/v1/questions/{id}/vote {"upvote":true}   -> {"votes":1}
//! POST /api/v1/answers/{id}/flag   {"reason":"nsfw"} -> 201
//! ```

use actix_web::{HttpResponse, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ContentRef, Flag, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::answers::answer_id;
use crate::inbound::http::questions::question_id;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_json_body;

/// Vote toggle. `true` adds the caller's vote, `false` withdraws it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteRequest {
    pub upvote: Option<bool>,
}

/// Vote count after the change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoteResponse {
    pub votes: i64,
}

/// Flag payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FlagRequest {
    /// One of `nsfw`, `prom`, `hurt`, `less`.
    #[schema(example = "nsfw")]
    pub reason: Option<String>,
}

/// Recorded flag. Exactly one of `question` and `answer` is present.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Uuid>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<Flag> for FlagResponse {
    fn from(value: Flag) -> Self {
        let (question, answer) = match value.target {
            ContentRef::Question(id) => (Some(*id.as_uuid()), None),
            ContentRef::Answer(id) => (None, Some(*id.as_uuid())),
        };
        Self {
            id: value.id,
            user: *value.user.as_uuid(),
            question,
            answer,
            reason: value.reason.as_str().to_owned(),
            created_at: value.created_at,
        }
    }
}

async fn vote(
    state: &HttpState,
    actor: UserId,
    target: ContentRef,
    payload: VoteRequest,
) -> ApiResult<web::Json<VoteResponse>> {
    let votes = state.votes.vote(&actor, target, payload.upvote).await?;
    Ok(web::Json(VoteResponse { votes }))
}

async fn flag(
    state: &HttpState,
    actor: UserId,
    target: ContentRef,
    payload: FlagRequest,
) -> ApiResult<HttpResponse> {
    let flag = state.flags.flag(&actor, target, payload.reason).await?;
    Ok(HttpResponse::Created().json(FlagResponse::from(flag)))
}

/// Add or withdraw the caller's vote on a question.
#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/vote",
    params(("id" = Uuid, Path, description = "Question id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "New vote count", body = VoteResponse),
        (status = 400, description = "Missing direction, repeat vote or withdrawing a vote never cast", body = ErrorSchema),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Question missing or deleted", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "voteQuestion"
)]
#[post("/questions/{id}/vote")]
pub async fn vote_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<VoteResponse>> {
    let actor = session.require_actor(&*state.login).await?;
    let target = ContentRef::Question(question_id(&path)?);
    vote(&state, actor, target, parse_json_body::<VoteRequest>(&body)?).await
}

/// Add or withdraw the caller's vote on an answer.
#[utoipa::path(
    post,
    path = "/api/v1/answers/{id}/vote",
    params(("id" = Uuid, Path, description = "Answer id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "New vote count", body = VoteResponse),
        (status = 400, description = "Missing direction, repeat vote or withdrawing a vote never cast", body = ErrorSchema),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Answer missing or deleted", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "voteAnswer"
)]
#[post("/answers/{id}/vote")]
pub async fn vote_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<VoteResponse>> {
    let actor = session.require_actor(&*state.login).await?;
    let target = ContentRef::Answer(answer_id(&path)?);
    vote(&state, actor, target, parse_json_body::<VoteRequest>(&body)?).await
}

/// Flag a question, hiding it from every read endpoint.
#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/flag",
    params(("id" = Uuid, Path, description = "Question id")),
    request_body = FlagRequest,
    responses(
        (status = 201, description = "Flag recorded", body = FlagResponse),
        (status = 400, description = "Unknown reason or already flagged by the caller", body = ErrorSchema),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Question missing or deleted", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "flagQuestion"
)]
#[post("/questions/{id}/flag")]
pub async fn flag_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(&*state.login).await?;
    let target = ContentRef::Question(question_id(&path)?);
    flag(&state, actor, target, parse_json_body::<FlagRequest>(&body)?).await
}

/// Flag an answer, hiding it from every read endpoint.
#[utoipa::path(
    post,
    path = "/api/v1/answers/{id}/flag",
    params(("id" = Uuid, Path, description = "Answer id")),
    request_body = FlagRequest,
    responses(
        (status = 201, description = "Flag recorded", body = FlagResponse),
        (status = 400, description = "Unknown reason or already flagged by the caller", body = ErrorSchema),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Answer missing or deleted", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "flagAnswer"
)]
#[post("/answers/{id}/flag")]
pub async fn flag_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(&*state.login).await?;
    let target = ContentRef::Answer(answer_id(&path)?);
    flag(&state, actor, target, parse_json_body::<FlagRequest>(&body)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{memory_state, signed_in, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(crate::inbound::http::accounts::register)
                    .service(crate::inbound::http::accounts::login)
                    .service(crate::inbound::http::questions::create_question)
                    .service(crate::inbound::http::questions::get_question)
                    .service(vote_question)
                    .service(vote_answer)
                    .service(flag_question)
                    .service(flag_answer),
            )
    }

    #[rstest]
    fn flag_response_names_only_its_target() {
        let flag = Flag {
            id: Uuid::nil(),
            user: UserId::random(),
            target: ContentRef::Answer(crate::domain::AnswerId::random()),
            reason: crate::domain::FlagReason::Hurt,
            created_at: crate::test_support::fixture_timestamp(),
        };

        let json = serde_json::to_value(FlagResponse::from(flag)).expect("serialise");

        assert!(json.get("question").is_none());
        assert!(json.get("answer").is_some());
        assert_eq!(json["reason"], "hurt");
    }

    #[actix_web::test]
    async fn vote_toggles_and_rejects_repeats() {
        let (state, store) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (_, cookie) = signed_in(&app, &store, 40).await;
        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/questions")
                .cookie(cookie.clone())
                .set_json(json!({"title": "Bus route to campus?"}))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(created).await;
        let uri = format!(
            "/api/v1/questions/{}/vote",
            body["id"].as_str().expect("question id")
        );

        let steps = [
            (json!({"upvote": true}), StatusCode::OK, Some(1)),
            (json!({"upvote": true}), StatusCode::BAD_REQUEST, None),
            (json!({"upvote": false}), StatusCode::OK, Some(0)),
            (json!({"upvote": false}), StatusCode::BAD_REQUEST, None),
            (json!({}), StatusCode::BAD_REQUEST, None),
        ];
        for (payload, status, votes) in steps {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri(&uri)
                    .cookie(cookie.clone())
                    .set_json(payload)
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), status);
            let body: Value = actix_test::read_body_json(res).await;
            if let Some(expected) = votes {
                assert_eq!(body["votes"], expected);
            }
        }
    }

    #[actix_web::test]
    async fn vote_on_unknown_answer_is_not_found() {
        let (state, store) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (_, cookie) = signed_in(&app, &store, 41).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/answers/{}/vote", Uuid::new_v4()))
                .cookie(cookie)
                .set_json(json!({"upvote": true}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "Answer does not exist");
    }

    #[actix_web::test]
    async fn anonymous_vote_is_forbidden() {
        let (state, _) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/questions/{}/vote", Uuid::new_v4()))
                .set_json(json!({"upvote": true}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn flag_hides_question_and_rejects_second_flag() {
        let (state, store) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (_, owner) = signed_in(&app, &store, 42).await;
        let (flagger_id, flagger) = signed_in(&app, &store, 43).await;
        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/questions")
                .cookie(owner.clone())
                .set_json(json!({"title": "Selling notes, DM me"}))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(created).await;
        let id = body["id"].as_str().expect("question id").to_owned();

        let flagged = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/questions/{id}/flag"))
                .cookie(flagger.clone())
                .set_json(json!({"reason": "prom"}))
                .to_request(),
        )
        .await;
        assert_eq!(flagged.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(flagged).await;
        assert_eq!(body["user"], flagger_id.as_str());
        assert_eq!(body["question"], id.as_str());
        assert_eq!(body["reason"], "prom");

        let hidden = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/questions/{id}"))
                .cookie(owner)
                .to_request(),
        )
        .await;
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

        let again = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/questions/{id}/flag"))
                .cookie(flagger)
                .set_json(json!({"reason": "nsfw"}))
                .to_request(),
        )
        .await;
        assert_eq!(again.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"reason": "spam"}))]
    #[actix_web::test]
    async fn flag_requires_known_reason(#[case] payload: Value) {
        let (state, store) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let (_, cookie) = signed_in(&app, &store, 44).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/answers/{}/flag", Uuid::new_v4()))
                .cookie(cookie)
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
