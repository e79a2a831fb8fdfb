//! Port for answer persistence.

use async_trait::async_trait;

use crate::domain::{Answer, AnswerId, AnswerView, QuestionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by answer repository adapters.
    pub enum AnswerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "answer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "answer repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Visible answers under a question, newest first.
    async fn list_visible(
        &self,
        question_id: &QuestionId,
        viewer: &UserId,
    ) -> Result<Vec<AnswerView>, AnswerRepositoryError>;

    /// A single visible answer that belongs to `question_id`.
    async fn find_visible(
        &self,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        viewer: &UserId,
    ) -> Result<Option<AnswerView>, AnswerRepositoryError>;

    async fn insert(&self, answer: &Answer) -> Result<(), AnswerRepositoryError>;

    async fn update_body(&self, id: &AnswerId, body: &str) -> Result<(), AnswerRepositoryError>;

    /// Clear `is_active`.
    async fn deactivate(&self, id: &AnswerId) -> Result<(), AnswerRepositoryError>;
}
