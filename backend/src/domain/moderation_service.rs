//! Voting and flagging use cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    FlagCommand, FlagRepository, FlagRepositoryError, VoteCommand, VoteRepository,
    VoteRepositoryError,
};
use crate::domain::question_service::missing_field;
use crate::domain::{ContentRef, Error, Flag, FlagReason, UserId};

/// Voting ledger service.
#[derive(Clone)]
pub struct VoteService<V> {
    votes: Arc<V>,
}

impl<V> VoteService<V> {
    pub fn new(votes: Arc<V>) -> Self {
        Self { votes }
    }
}

fn map_vote_error(target: ContentRef, error: VoteRepositoryError) -> Error {
    let label = target.kind().label();
    match error {
        VoteRepositoryError::TargetNotFound => {
            Error::not_found(format!("{label} does not exist"))
        }
        VoteRepositoryError::AlreadyVoted => Error::conflict(format!("Invalid {label} vote"))
            .with_details(json!({ "code": "already_voted" })),
        VoteRepositoryError::NotVoted => Error::conflict(format!("Invalid {label} vote"))
            .with_details(json!({ "code": "not_voted" })),
        VoteRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("vote repository unavailable: {message}"))
        }
        VoteRepositoryError::Query { message } => {
            Error::internal(format!("vote repository error: {message}"))
        }
    }
}

#[async_trait]
impl<V> VoteCommand for VoteService<V>
where
    V: VoteRepository,
{
    async fn vote(
        &self,
        actor: &UserId,
        target: ContentRef,
        upvote: Option<bool>,
    ) -> Result<i64, Error> {
        let upvote = upvote.ok_or_else(|| {
            Error::invalid_request("Missing required parameter").with_details(json!({
                "field": "upvote",
                "code": "missing_field",
            }))
        })?;
        self.votes
            .cast_vote(target, actor, upvote)
            .await
            .map_err(|err| {
                debug!(target_id = %target.as_uuid(), upvote, error = %err, "vote rejected");
                map_vote_error(target, err)
            })
    }
}

/// Flag ledger service.
#[derive(Clone)]
pub struct FlagService<F> {
    flags: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> FlagService<F> {
    pub fn new(flags: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { flags, clock }
    }
}

fn map_flag_error(target: ContentRef, error: FlagRepositoryError) -> Error {
    match error {
        FlagRepositoryError::TargetNotFound => {
            Error::not_found(format!("{} does not exist", target.kind().label()))
        }
        FlagRepositoryError::Duplicate => Error::conflict("content already flagged")
            .with_details(json!({ "code": "duplicate_flag" })),
        FlagRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("flag repository unavailable: {message}"))
        }
        FlagRepositoryError::Query { message } => {
            Error::internal(format!("flag repository error: {message}"))
        }
    }
}

#[async_trait]
impl<F> FlagCommand for FlagService<F>
where
    F: FlagRepository,
{
    async fn flag(
        &self,
        actor: &UserId,
        target: ContentRef,
        reason: Option<String>,
    ) -> Result<Flag, Error> {
        let raw = reason.ok_or_else(|| missing_field("reason"))?;
        let reason = FlagReason::parse(raw.trim()).ok_or_else(|| {
            Error::invalid_request(format!("unknown flag reason: {raw}")).with_details(json!({
                "field": "reason",
                "code": "invalid_reason",
                "allowed": ["nsfw", "prom", "hurt", "less"],
            }))
        })?;
        let flag = Flag {
            id: Uuid::new_v4(),
            user: *actor,
            target,
            reason,
            created_at: self.clock.utc(),
        };
        self.flags.insert(&flag).await.map_err(|err| {
            debug!(target_id = %target.as_uuid(), error = %err, "flag rejected");
            map_flag_error(target, err)
        })?;
        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockFlagRepository, MockVoteRepository};
    use crate::domain::{AnswerId, ErrorCode, QuestionId};
    use crate::test_support::fixture_clock;
    use rstest::rstest;

    fn question_target() -> ContentRef {
        ContentRef::Question(QuestionId::random())
    }

    #[rstest]
    #[case(true, 3)]
    #[case(false, 1)]
    #[tokio::test]
    async fn vote_returns_new_count(#[case] upvote: bool, #[case] count: i64) {
        let mut repo = MockVoteRepository::new();
        repo.expect_cast_vote()
            .withf(move |_, _, requested| *requested == upvote)
            .times(1)
            .return_once(move |_, _, _| Ok(count));

        let votes = VoteService::new(Arc::new(repo))
            .vote(&UserId::random(), question_target(), Some(upvote))
            .await
            .expect("vote accepted");
        assert_eq!(votes, count);
    }

    #[tokio::test]
    async fn vote_without_direction_is_bad_request() {
        let mut repo = MockVoteRepository::new();
        repo.expect_cast_vote().never();
        let err = VoteService::new(Arc::new(repo))
            .vote(&UserId::random(), question_target(), None)
            .await
            .expect_err("missing upvote");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(VoteRepositoryError::already_voted(), ErrorCode::Conflict, "Invalid Answer vote")]
    #[case(VoteRepositoryError::not_voted(), ErrorCode::Conflict, "Invalid Answer vote")]
    #[case(VoteRepositoryError::target_not_found(), ErrorCode::NotFound, "Answer does not exist")]
    #[tokio::test]
    async fn vote_errors_are_labelled_by_kind(
        #[case] error: VoteRepositoryError,
        #[case] code: ErrorCode,
        #[case] message: &str,
    ) {
        let mut repo = MockVoteRepository::new();
        repo.expect_cast_vote().return_once(move |_, _, _| Err(error));
        let err = VoteService::new(Arc::new(repo))
            .vote(
                &UserId::random(),
                ContentRef::Answer(AnswerId::random()),
                Some(true),
            )
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), code);
        assert_eq!(err.message(), message);
    }

    #[tokio::test]
    async fn vote_query_failure_is_internal() {
        let mut repo = MockVoteRepository::new();
        repo.expect_cast_vote()
            .return_once(|_, _, _| Err(VoteRepositoryError::query("deadlock")));
        let err = VoteService::new(Arc::new(repo))
            .vote(&UserId::random(), question_target(), Some(true))
            .await
            .expect_err("failed");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn flag_records_reason_and_actor() {
        let actor = UserId::random();
        let mut repo = MockFlagRepository::new();
        repo.expect_insert()
            .withf(move |flag| flag.user == actor && flag.reason == FlagReason::Hurt)
            .times(1)
            .return_once(|_| Ok(()));

        let flag = FlagService::new(Arc::new(repo), fixture_clock())
            .flag(&actor, question_target(), Some("hurt".into()))
            .await
            .expect("flagged");
        assert_eq!(flag.reason, FlagReason::Hurt);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("spam".to_owned()))]
    #[tokio::test]
    async fn flag_requires_known_reason(#[case] reason: Option<String>) {
        let mut repo = MockFlagRepository::new();
        repo.expect_insert().never();
        let err = FlagService::new(Arc::new(repo), fixture_clock())
            .flag(&UserId::random(), question_target(), reason)
            .await
            .expect_err("bad reason");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(FlagRepositoryError::duplicate(), ErrorCode::Conflict)]
    #[case(FlagRepositoryError::target_not_found(), ErrorCode::NotFound)]
    #[case(FlagRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn flag_errors_map_to_codes(#[case] error: FlagRepositoryError, #[case] code: ErrorCode) {
        let mut repo = MockFlagRepository::new();
        repo.expect_insert().return_once(move |_| Err(error));
        let err = FlagService::new(Arc::new(repo), fixture_clock())
            .flag(&UserId::random(), question_target(), Some("nsfw".into()))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), code);
    }
}
