//! Port for question persistence.
//!
//! Every `*_visible` read applies the visibility rule: only active questions
//! with no flags are returned. Mutations address rows by id and do not check
//! visibility themselves; the service loads the visible row first.

use async_trait::async_trait;

use crate::domain::{Question, QuestionDraft, QuestionId, QuestionView, TagSlug, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by question repository adapters.
    pub enum QuestionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "question repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "question repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Visible questions, newest first, with vote data for `viewer`.
    async fn list_visible(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<QuestionView>, QuestionRepositoryError>;

    /// A single visible question with vote data for `viewer`.
    async fn find_visible(
        &self,
        id: &QuestionId,
        viewer: &UserId,
    ) -> Result<Option<QuestionView>, QuestionRepositoryError>;

    /// Slugs from `slugs` that do not name an existing tag.
    async fn missing_tags(&self, slugs: &[TagSlug])
    -> Result<Vec<TagSlug>, QuestionRepositoryError>;

    /// Insert a question together with its tag links.
    async fn insert(&self, question: &Question) -> Result<(), QuestionRepositoryError>;

    /// Replace the author-editable fields and tag links.
    async fn update(
        &self,
        id: &QuestionId,
        draft: &QuestionDraft,
    ) -> Result<(), QuestionRepositoryError>;

    /// Clear `is_active`.
    async fn deactivate(&self, id: &QuestionId) -> Result<(), QuestionRepositoryError>;

    /// Whether at least one active answer exists under the question.
    async fn has_active_answers(&self, id: &QuestionId) -> Result<bool, QuestionRepositoryError>;
}
