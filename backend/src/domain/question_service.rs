//! Question use cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{QuestionCommand, QuestionInput, QuestionQuery, QuestionRepository};
use crate::domain::repository_errors::map_question_error;
use crate::domain::{
    Action, ContentValidationError, Error, Question, QuestionDraft, QuestionId, QuestionView,
    Resource, UserId, authorize,
};

pub(crate) fn content_validation_error(error: &ContentValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_content",
    }))
}

pub(crate) fn missing_field(field: &str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

pub(crate) fn question_not_found() -> Error {
    Error::not_found("Question does not exist")
}

/// Question service implementing the question driving ports.
#[derive(Clone)]
pub struct QuestionService<Q> {
    questions: Arc<Q>,
    clock: Arc<dyn Clock>,
}

impl<Q> QuestionService<Q> {
    pub fn new(questions: Arc<Q>, clock: Arc<dyn Clock>) -> Self {
        Self { questions, clock }
    }
}

impl<Q> QuestionService<Q>
where
    Q: QuestionRepository,
{
    async fn load_visible(&self, id: &QuestionId, viewer: &UserId) -> Result<QuestionView, Error> {
        self.questions
            .find_visible(id, viewer)
            .await
            .map_err(map_question_error)?
            .ok_or_else(question_not_found)
    }

    async fn validate(&self, input: QuestionInput) -> Result<QuestionDraft, Error> {
        let QuestionInput {
            title,
            body,
            scope,
            tags,
        } = input;
        let title = title.ok_or_else(|| missing_field("title"))?;
        let draft = QuestionDraft::try_new(&title, body, scope, tags)
            .map_err(|err| content_validation_error(&err))?;

        let missing = self
            .questions
            .missing_tags(&draft.tags)
            .await
            .map_err(map_question_error)?;
        if !missing.is_empty() {
            let unknown: Vec<&str> = missing.iter().map(AsRef::as_ref).collect();
            return Err(Error::invalid_request("unknown tags").with_details(json!({
                "field": "tags",
                "code": "unknown_tag",
                "unknown": unknown,
            })));
        }
        Ok(draft)
    }
}

#[async_trait]
impl<Q> QuestionQuery for QuestionService<Q>
where
    Q: QuestionRepository,
{
    async fn list(&self, viewer: &UserId) -> Result<Vec<QuestionView>, Error> {
        self.questions
            .list_visible(viewer)
            .await
            .map_err(map_question_error)
    }

    async fn get(&self, viewer: &UserId, id: &QuestionId) -> Result<QuestionView, Error> {
        self.load_visible(id, viewer).await
    }
}

#[async_trait]
impl<Q> QuestionCommand for QuestionService<Q>
where
    Q: QuestionRepository,
{
    async fn create(&self, actor: &UserId, input: QuestionInput) -> Result<QuestionView, Error> {
        let QuestionDraft {
            title,
            body,
            scope,
            tags,
        } = self.validate(input).await?;
        let question = Question {
            id: QuestionId::random(),
            owner: *actor,
            title,
            body,
            scope,
            tags,
            is_active: true,
            created_at: self.clock.utc(),
        };
        self.questions
            .insert(&question)
            .await
            .map_err(map_question_error)?;
        Ok(QuestionView {
            question,
            votes: 0,
            has_voted: false,
        })
    }

    async fn update(
        &self,
        actor: &UserId,
        id: &QuestionId,
        input: QuestionInput,
    ) -> Result<QuestionView, Error> {
        let current = self.load_visible(id, actor).await?;
        authorize(
            *actor,
            Resource::Content {
                owner: current.question.owner,
            },
            Action::Update,
        )
        .require("Editing questions is restricted to the author only.")?;

        let answered = self
            .questions
            .has_active_answers(id)
            .await
            .map_err(map_question_error)?;
        if answered {
            debug!(question_id = %id, "update rejected: question already answered");
            return Err(Error::conflict("Answered questions cannot be updated")
                .with_details(json!({ "code": "question_answered" })));
        }

        let draft = self.validate(input).await?;
        self.questions
            .update(id, &draft)
            .await
            .map_err(map_question_error)?;
        self.load_visible(id, actor).await
    }

    async fn delete(&self, actor: &UserId, id: &QuestionId) -> Result<(), Error> {
        let current = self.load_visible(id, actor).await?;
        authorize(
            *actor,
            Resource::Content {
                owner: current.question.owner,
            },
            Action::Delete,
        )
        .require("Deleting questions is restricted to the author only.")?;
        self.questions
            .deactivate(id)
            .await
            .map_err(map_question_error)
    }
}

#[cfg(test)]
#[path = "question_service_tests.rs"]
mod tests;
