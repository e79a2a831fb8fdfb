//! Port for the voting ledger.
//!
//! A vote is a single atomic step: lock the target, check membership, write,
//! count. Adapters must run all four under one transaction (or one lock) so
//! concurrent votes by the same user cannot both succeed.

use async_trait::async_trait;

use crate::domain::{ContentRef, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote repository adapters.
    pub enum VoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "vote repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "vote repository query failed: {message}",
        /// The target does not exist or is inactive.
        TargetNotFound =>
            "vote target not found",
        /// Upvote requested but the voter already voted.
        AlreadyVoted =>
            "voter has already voted",
        /// Vote removal requested but the voter has not voted.
        NotVoted =>
            "voter has not voted",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Add (`upvote = true`) or remove the voter's vote and return the new
    /// vote count of the target.
    async fn cast_vote(
        &self,
        target: ContentRef,
        voter: &UserId,
        upvote: bool,
    ) -> Result<i64, VoteRepositoryError>;
}
