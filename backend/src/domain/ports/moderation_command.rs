//! Driving ports for votes and flags.

use async_trait::async_trait;

use crate::domain::{ContentRef, Error, Flag, UserId};

#[async_trait]
pub trait VoteCommand: Send + Sync {
    /// Add (`Some(true)`) or remove (`Some(false)`) the actor's vote and return
    /// the target's new vote count. `None` is a malformed request.
    async fn vote(
        &self,
        actor: &UserId,
        target: ContentRef,
        upvote: Option<bool>,
    ) -> Result<i64, Error>;
}

#[async_trait]
pub trait FlagCommand: Send + Sync {
    /// Flag an active target with a reason code.
    async fn flag(
        &self,
        actor: &UserId,
        target: ContentRef,
        reason: Option<String>,
    ) -> Result<Flag, Error>;
}
