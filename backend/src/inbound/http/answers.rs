//! Answer handlers, nested under their question.
//!
//! The parent question must itself be visible; answers under a deleted or
//! flagged question read as not found.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{AnswerId, AnswerView, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::questions::question_id;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_json_body, parse_uuid};

/// Create and update payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerRequest {
    #[schema(example = "Room 204, second floor.")]
    pub body: Option<String>,
}

/// Answer as seen by the requesting user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: Uuid,
    pub question: Uuid,
    /// Owning account id.
    pub user: Uuid,
    pub body: String,
    pub votes: i64,
    pub has_voted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AnswerView> for AnswerResponse {
    fn from(value: AnswerView) -> Self {
        let AnswerView {
            answer,
            votes,
            has_voted,
        } = value;
        Self {
            id: *answer.id.as_uuid(),
            question: *answer.question_id.as_uuid(),
            user: *answer.owner.as_uuid(),
            body: answer.body,
            votes,
            has_voted,
            created_at: answer.created_at,
        }
    }
}

pub(crate) fn answer_id(raw: &str) -> Result<AnswerId, Error> {
    parse_uuid(raw, FieldName::new("answerId")).map(AnswerId::from)
}

/// List visible answers to a visible question, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/questions/{question_id}/answers",
    params(("question_id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 200, description = "Answers", body = [AnswerResponse]),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Question missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "listAnswers"
)]
#[get("/questions/{question_id}/answers")]
pub async fn list_answers(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<AnswerResponse>>> {
    let viewer = session.require_actor(&*state.login).await?;
    let question = question_id(&path)?;
    let answers = state.answers_query.list(&viewer, &question).await?;
    Ok(web::Json(answers.into_iter().map(AnswerResponse::from).collect()))
}

/// Answer a question as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/questions/{question_id}/answers",
    params(("question_id" = Uuid, Path, description = "Question id")),
    request_body = AnswerRequest,
    responses(
        (status = 201, description = "Answer created", body = AnswerResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Question missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "createAnswer"
)]
#[post("/questions/{question_id}/answers")]
pub async fn create_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(&*state.login).await?;
    let question = question_id(&path)?;
    let request = parse_json_body::<AnswerRequest>(&body)?;
    let view = state.answers.create(&actor, &question, request.body).await?;
    Ok(HttpResponse::Created().json(AnswerResponse::from(view)))
}

/// Fetch one visible answer.
#[utoipa::path(
    get,
    path = "/api/v1/questions/{question_id}/answers/{answer_id}",
    params(
        ("question_id" = Uuid, Path, description = "Question id"),
        ("answer_id" = Uuid, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "Answer", body = AnswerResponse),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "getAnswer"
)]
#[get("/questions/{question_id}/answers/{answer_id}")]
pub async fn get_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<AnswerResponse>> {
    let viewer = session.require_actor(&*state.login).await?;
    let (question_raw, answer_raw) = path.into_inner();
    let question = question_id(&question_raw)?;
    let answer = answer_id(&answer_raw)?;
    let view = state.answers_query.get(&viewer, &question, &answer).await?;
    Ok(web::Json(view.into()))
}

/// Replace an answer's body.
#[utoipa::path(
    put,
    path = "/api/v1/questions/{question_id}/answers/{answer_id}",
    params(
        ("question_id" = Uuid, Path, description = "Question id"),
        ("answer_id" = Uuid, Path, description = "Answer id")
    ),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Updated answer", body = AnswerResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not signed in or not the owner", body = ErrorSchema),
        (status = 404, description = "Missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "updateAnswer"
)]
#[put("/questions/{question_id}/answers/{answer_id}")]
pub async fn update_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> ApiResult<web::Json<AnswerResponse>> {
    let actor = session.require_actor(&*state.login).await?;
    let (question_raw, answer_raw) = path.into_inner();
    let question = question_id(&question_raw)?;
    let answer = answer_id(&answer_raw)?;
    let request = parse_json_body::<AnswerRequest>(&body)?;
    let view = state
        .answers
        .update(&actor, &question, &answer, request.body)
        .await?;
    Ok(web::Json(view.into()))
}

/// Soft-delete an answer.
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{question_id}/answers/{answer_id}",
    params(
        ("question_id" = Uuid, Path, description = "Question id"),
        ("answer_id" = Uuid, Path, description = "Answer id")
    ),
    responses(
        (status = 204, description = "Answer deleted"),
        (status = 403, description = "Not signed in or not the owner", body = ErrorSchema),
        (status = 404, description = "Missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "deleteAnswer"
)]
#[delete("/questions/{question_id}/answers/{answer_id}")]
pub async fn delete_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(&*state.login).await?;
    let (question_raw, answer_raw) = path.into_inner();
    let question = question_id(&question_raw)?;
    let answer = answer_id(&answer_raw)?;
    state.answers.delete(&actor, &question, &answer).await?;
    Ok(HttpResponse::NoContent().finish())
}
