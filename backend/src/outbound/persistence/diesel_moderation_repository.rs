//! PostgreSQL-backed vote and flag ledgers.
//!
//! A vote locks the target row with `SELECT ... FOR UPDATE` before checking
//! membership, so two concurrent votes by the same user on the same target
//! serialise and exactly one succeeds. The primary key on the vote tables is
//! the final guard.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    FlagRepository, FlagRepositoryError, VoteRepository, VoteRepositoryError,
};
use crate::domain::{ContentRef, Flag, UserId};

use super::error_mapping::{DieselFailure, classify, pool_error_message};
use super::models::{NewAnswerFlagRow, NewAnswerVoteRow, NewQuestionFlagRow, NewQuestionVoteRow};
use super::pool::DbPool;
use super::schema::{answer_flags, answer_votes, answers, question_flags, question_votes, questions};

/// Outcome of a vote transaction that ran to completion without a database
/// failure.
type VoteOutcome = Result<i64, VoteRepositoryError>;

/// Diesel-backed voting ledger.
#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_vote_error(error: diesel::result::Error) -> VoteRepositoryError {
    match classify(error) {
        DieselFailure::Connection => VoteRepositoryError::connection("database connection error"),
        // Only reachable if the row lock was bypassed; report as a repeat vote.
        DieselFailure::Unique { .. } => VoteRepositoryError::already_voted(),
        DieselFailure::ForeignKey { .. } => VoteRepositoryError::target_not_found(),
        DieselFailure::Query(message) => VoteRepositoryError::query(message),
    }
}

/// Generates the vote transaction body for one content table and its vote
/// ledger. Must run inside a transaction for the row lock to hold.
macro_rules! vote_on {
    ($name:ident, $content:ident, $ledger:ident, $target_column:ident, $row:ident) => {
        async fn $name(
            conn: &mut AsyncPgConnection,
            target_id: Uuid,
            voter: Uuid,
            upvote: bool,
        ) -> QueryResult<VoteOutcome> {
            let locked: Option<Uuid> = $content::table
                .filter($content::id.eq(target_id))
                .filter($content::is_active.eq(true))
                .select($content::id)
                .for_update()
                .first(conn)
                .await
                .optional()?;
            if locked.is_none() {
                return Ok(Err(VoteRepositoryError::target_not_found()));
            }

            let mine = $ledger::table
                .filter($ledger::$target_column.eq(target_id))
                .filter($ledger::user_id.eq(voter));
            let already: bool = diesel::select(diesel::dsl::exists(mine.clone()))
                .get_result(conn)
                .await?;

            match (upvote, already) {
                (true, true) => return Ok(Err(VoteRepositoryError::already_voted())),
                (false, false) => return Ok(Err(VoteRepositoryError::not_voted())),
                (true, false) => {
                    diesel::insert_into($ledger::table)
                        .values(&$row {
                            $target_column: target_id,
                            user_id: voter,
                        })
                        .execute(conn)
                        .await?;
                }
                (false, true) => {
                    diesel::delete(mine).execute(conn).await?;
                }
            }

            let total: i64 = $ledger::table
                .filter($ledger::$target_column.eq(target_id))
                .count()
                .get_result(conn)
                .await?;
            Ok(Ok(total))
        }
    };
}

vote_on!(vote_on_question, questions, question_votes, question_id, NewQuestionVoteRow);
vote_on!(vote_on_answer, answers, answer_votes, answer_id, NewAnswerVoteRow);

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn cast_vote(
        &self,
        target: ContentRef,
        voter: &UserId,
        upvote: bool,
    ) -> Result<i64, VoteRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| VoteRepositoryError::connection(pool_error_message(err)))?;
        let voter = *voter.as_uuid();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                match target {
                    ContentRef::Question(id) => {
                        vote_on_question(conn, *id.as_uuid(), voter, upvote).await
                    }
                    ContentRef::Answer(id) => {
                        vote_on_answer(conn, *id.as_uuid(), voter, upvote).await
                    }
                }
            }
            .scope_boxed()
        })
        .await
        .map_err(map_vote_error)?
    }
}

/// Diesel-backed flag ledger.
#[derive(Clone)]
pub struct DieselFlagRepository {
    pool: DbPool,
}

impl DieselFlagRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_flag_error(error: diesel::result::Error) -> FlagRepositoryError {
    match classify(error) {
        DieselFailure::Connection => FlagRepositoryError::connection("database connection error"),
        DieselFailure::Unique { .. } => FlagRepositoryError::duplicate(),
        DieselFailure::ForeignKey { .. } => FlagRepositoryError::target_not_found(),
        DieselFailure::Query(message) => FlagRepositoryError::query(message),
    }
}

async fn target_is_active(conn: &mut AsyncPgConnection, target: ContentRef) -> QueryResult<bool> {
    match target {
        ContentRef::Question(id) => {
            diesel::select(diesel::dsl::exists(
                questions::table
                    .filter(questions::id.eq(*id.as_uuid()))
                    .filter(questions::is_active.eq(true)),
            ))
            .get_result(conn)
            .await
        }
        ContentRef::Answer(id) => {
            diesel::select(diesel::dsl::exists(
                answers::table
                    .filter(answers::id.eq(*id.as_uuid()))
                    .filter(answers::is_active.eq(true)),
            ))
            .get_result(conn)
            .await
        }
    }
}

#[async_trait]
impl FlagRepository for DieselFlagRepository {
    async fn insert(&self, flag: &Flag) -> Result<(), FlagRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| FlagRepositoryError::connection(pool_error_message(err)))?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                if !target_is_active(conn, flag.target).await? {
                    return Ok(Err(FlagRepositoryError::target_not_found()));
                }
                let user_id = *flag.user.as_uuid();
                let reason = flag.reason.as_str();
                match flag.target {
                    ContentRef::Question(id) => {
                        diesel::insert_into(question_flags::table)
                            .values(&NewQuestionFlagRow {
                                id: flag.id,
                                question_id: *id.as_uuid(),
                                user_id,
                                reason,
                                created_at: flag.created_at,
                            })
                            .execute(conn)
                            .await?;
                    }
                    ContentRef::Answer(id) => {
                        diesel::insert_into(answer_flags::table)
                            .values(&NewAnswerFlagRow {
                                id: flag.id,
                                answer_id: *id.as_uuid(),
                                user_id,
                                reason,
                                created_at: flag.created_at,
                            })
                            .execute(conn)
                            .await?;
                    }
                }
                Ok(Ok(()))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_flag_error)?
    }
}
