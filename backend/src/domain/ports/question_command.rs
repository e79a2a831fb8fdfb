//! Driving ports for questions and answers.

use async_trait::async_trait;

use crate::domain::{AnswerId, AnswerView, Error, QuestionId, QuestionView, Scope, UserId};

/// Author-supplied question fields before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub scope: Option<Scope>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait QuestionCommand: Send + Sync {
    /// Create a question owned by `actor`.
    async fn create(&self, actor: &UserId, input: QuestionInput) -> Result<QuestionView, Error>;

    /// Replace the editable fields. Rejected once an active answer exists.
    async fn update(
        &self,
        actor: &UserId,
        id: &QuestionId,
        input: QuestionInput,
    ) -> Result<QuestionView, Error>;

    /// Soft delete.
    async fn delete(&self, actor: &UserId, id: &QuestionId) -> Result<(), Error>;
}

#[async_trait]
pub trait QuestionQuery: Send + Sync {
    async fn list(&self, viewer: &UserId) -> Result<Vec<QuestionView>, Error>;

    async fn get(&self, viewer: &UserId, id: &QuestionId) -> Result<QuestionView, Error>;
}

#[async_trait]
pub trait AnswerCommand: Send + Sync {
    /// Answer a visible question.
    async fn create(
        &self,
        actor: &UserId,
        question_id: &QuestionId,
        body: Option<String>,
    ) -> Result<AnswerView, Error>;

    async fn update(
        &self,
        actor: &UserId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        body: Option<String>,
    ) -> Result<AnswerView, Error>;

    /// Soft delete.
    async fn delete(
        &self,
        actor: &UserId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait AnswerQuery: Send + Sync {
    async fn list(&self, viewer: &UserId, question_id: &QuestionId)
    -> Result<Vec<AnswerView>, Error>;

    async fn get(
        &self,
        viewer: &UserId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<AnswerView, Error>;
}
