//! Question handlers.
//!
//! Every endpoint requires a session. Reads only ever see visible questions
//! (active and unflagged); writes are limited to the owner.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::QuestionInput;
use crate::domain::{Error, QuestionId, QuestionView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_json_body, parse_scope, parse_uuid};

/// Create and update payload. An owner field, if sent, is ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionRequest {
    #[schema(example = "Where is the placement cell?")]
    pub title: Option<String>,
    pub body: Option<String>,
    /// One of `branch_grad_year`, `grad_year`, `college` (default).
    #[schema(example = "college")]
    pub scope: Option<String>,
    #[schema(example = json!(["general"]))]
    pub tags: Vec<String>,
}

impl TryFrom<QuestionRequest> for QuestionInput {
    type Error = Error;

    fn try_from(value: QuestionRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            scope: parse_scope(value.scope.as_deref())?,
            title: value.title,
            body: value.body,
            tags: value.tags,
        })
    }
}

/// Question as seen by the requesting user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    /// Owning account id.
    pub user: Uuid,
    #[schema(example = "college")]
    pub scope: String,
    pub tags: Vec<String>,
    pub votes: i64,
    pub has_voted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<QuestionView> for QuestionResponse {
    fn from(value: QuestionView) -> Self {
        let QuestionView {
            question,
            votes,
            has_voted,
        } = value;
        Self {
            id: *question.id.as_uuid(),
            title: question.title,
            body: question.body,
            user: *question.owner.as_uuid(),
            scope: question.scope.as_str().to_owned(),
            tags: question.tags.iter().map(|tag| tag.as_ref().to_owned()).collect(),
            votes,
            has_voted,
            created_at: question.created_at,
        }
    }
}

pub(crate) fn question_id(raw: &str) -> Result<QuestionId, Error> {
    parse_uuid(raw, FieldName::new("questionId")).map(QuestionId::from)
}

/// List visible questions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/questions",
    responses(
        (status = 200, description = "Questions", body = [QuestionResponse]),
        (status = 403, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "listQuestions"
)]
#[get("/questions")]
pub async fn list_questions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<QuestionResponse>>> {
    let viewer = session.require_actor(&*state.login).await?;
    let questions = state.questions_query.list(&viewer).await?;
    Ok(web::Json(
        questions.into_iter().map(QuestionResponse::from).collect(),
    ))
}

/// Ask a question as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/questions",
    request_body = QuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "createQuestion"
)]
#[post("/questions")]
pub async fn create_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(&*state.login).await?;
    let input = QuestionInput::try_from(parse_json_body::<QuestionRequest>(&body)?)?;
    let view = state.questions.create(&actor, input).await?;
    Ok(HttpResponse::Created().json(QuestionResponse::from(view)))
}

/// Fetch one visible question.
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question", body = QuestionResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 403, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "Missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "getQuestion"
)]
#[get("/questions/{id}")]
pub async fn get_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<QuestionResponse>> {
    let viewer = session.require_actor(&*state.login).await?;
    let id = question_id(&path)?;
    let view = state.questions_query.get(&viewer, &id).await?;
    Ok(web::Json(view.into()))
}

/// Replace an unanswered question's fields.
#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}",
    params(("id" = Uuid, Path, description = "Question id")),
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Updated question", body = QuestionResponse),
        (status = 400, description = "Invalid request or already answered", body = ErrorSchema),
        (status = 403, description = "Not signed in or not the owner", body = ErrorSchema),
        (status = 404, description = "Missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "updateQuestion"
)]
#[put("/questions/{id}")]
pub async fn update_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<QuestionResponse>> {
    let actor = session.require_actor(&*state.login).await?;
    let id = question_id(&path)?;
    let input = QuestionInput::try_from(parse_json_body::<QuestionRequest>(&body)?)?;
    let view = state.questions.update(&actor, &id, input).await?;
    Ok(web::Json(view.into()))
}

/// Soft-delete a question.
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 403, description = "Not signed in or not the owner", body = ErrorSchema),
        (status = 404, description = "Missing, deleted or flagged", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "deleteQuestion"
)]
#[delete("/questions/{id}")]
pub async fn delete_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(&*state.login).await?;
    let id = question_id(&path)?;
    state.questions.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
