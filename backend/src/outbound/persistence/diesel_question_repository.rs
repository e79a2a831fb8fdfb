//! PostgreSQL-backed `QuestionRepository` and `AnswerRepository`.
//!
//! Reads go through the visibility filters in [`super::visibility`] and then
//! attach tags and vote tallies with one batched query each, so a list costs
//! a fixed number of round trips regardless of page size.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{
    AnswerRepository, AnswerRepositoryError, QuestionRepository, QuestionRepositoryError,
};
use crate::domain::{
    Answer, AnswerId, AnswerView, Question, QuestionDraft, QuestionId, QuestionView, Scope,
    TagSlug, UserId,
};

use super::error_mapping::{DieselFailure, classify, pool_error_message};
use super::models::{AnswerRow, NewAnswerRow, NewQuestionRow, NewQuestionTagRow, QuestionRow, QuestionUpdate};
use super::pool::DbPool;
use super::schema::{answers, question_tags, questions, tags};
use super::visibility::{answer_tally, question_tally, visible_answers, visible_questions};

/// Diesel-backed question store.
#[derive(Clone)]
pub struct DieselQuestionRepository {
    pool: DbPool,
}

impl DieselQuestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_question_error(error: diesel::result::Error) -> QuestionRepositoryError {
    match classify(error) {
        DieselFailure::Connection => QuestionRepositoryError::connection("database connection error"),
        DieselFailure::ForeignKey { .. } => QuestionRepositoryError::query("unknown tag"),
        DieselFailure::Unique { .. } => QuestionRepositoryError::query("duplicate row"),
        DieselFailure::Query(message) => QuestionRepositoryError::query(message),
    }
}

fn parse_scope(raw: &str, id: Uuid) -> Scope {
    Scope::parse(raw).unwrap_or_else(|| {
        warn!(value = raw, question_id = %id, "unrecognised scope value, defaulting to college");
        Scope::College
    })
}

async fn load_tags(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, Vec<TagSlug>>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, String)> = question_tags::table
        .filter(question_tags::question_id.eq_any(ids))
        .order((question_tags::question_id, question_tags::tag_slug))
        .select((question_tags::question_id, question_tags::tag_slug))
        .load(conn)
        .await?;
    let mut by_question: HashMap<Uuid, Vec<TagSlug>> = HashMap::new();
    for (question_id, slug) in rows {
        by_question
            .entry(question_id)
            .or_default()
            .push(TagSlug::from_trusted(slug));
    }
    Ok(by_question)
}

/// Attach tags and the viewer's vote tally to question rows, keeping order.
async fn hydrate_questions(
    conn: &mut AsyncPgConnection,
    rows: Vec<QuestionRow>,
    viewer: &UserId,
) -> QueryResult<Vec<QuestionView>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut tags_by_question = load_tags(conn, &ids).await?;
    let tally = question_tally(conn, &ids, *viewer.as_uuid()).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let (votes, has_voted) = tally.for_id(&row.id);
            QuestionView {
                question: Question {
                    id: QuestionId::from(row.id),
                    owner: UserId::from(row.user_id),
                    scope: parse_scope(&row.scope, row.id),
                    tags: tags_by_question.remove(&row.id).unwrap_or_default(),
                    title: row.title,
                    body: row.body,
                    is_active: row.is_active,
                    created_at: row.created_at,
                },
                votes,
                has_voted,
            }
        })
        .collect())
}

fn tag_rows<'a>(question_id: Uuid, tags: &'a [TagSlug]) -> Vec<NewQuestionTagRow<'a>> {
    tags.iter()
        .map(|slug| NewQuestionTagRow {
            question_id,
            tag_slug: slug.as_ref(),
        })
        .collect()
}

#[async_trait]
impl QuestionRepository for DieselQuestionRepository {
    async fn list_visible(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<QuestionView>, QuestionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| QuestionRepositoryError::connection(pool_error_message(err)))?;
        let rows: Vec<QuestionRow> = visible_questions()
            .order((questions::created_at.desc(), questions::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_question_error)?;
        hydrate_questions(&mut conn, rows, viewer)
            .await
            .map_err(map_question_error)
    }

    async fn find_visible(
        &self,
        id: &QuestionId,
        viewer: &UserId,
    ) -> Result<Option<QuestionView>, QuestionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| QuestionRepositoryError::connection(pool_error_message(err)))?;
        let rows: Vec<QuestionRow> = visible_questions()
            .filter(questions::id.eq(id.as_uuid()))
            .load(&mut conn)
            .await
            .map_err(map_question_error)?;
        let views = hydrate_questions(&mut conn, rows, viewer)
            .await
            .map_err(map_question_error)?;
        Ok(views.into_iter().next())
    }

    async fn missing_tags(
        &self,
        slugs: &[TagSlug],
    ) -> Result<Vec<TagSlug>, QuestionRepositoryError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| QuestionRepositoryError::connection(pool_error_message(err)))?;
        let wanted: Vec<&str> = slugs.iter().map(AsRef::as_ref).collect();
        let known: Vec<String> = tags::table
            .filter(tags::slug.eq_any(wanted))
            .select(tags::slug)
            .load(&mut conn)
            .await
            .map_err(map_question_error)?;
        Ok(slugs
            .iter()
            .filter(|slug| !known.iter().any(|k| k == slug.as_ref()))
            .cloned()
            .collect())
    }

    async fn insert(&self, question: &Question) -> Result<(), QuestionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| QuestionRepositoryError::connection(pool_error_message(err)))?;
        let row = NewQuestionRow {
            id: *question.id.as_uuid(),
            user_id: *question.owner.as_uuid(),
            title: &question.title,
            body: question.body.as_deref(),
            scope: question.scope.as_str(),
            is_active: question.is_active,
            created_at: question.created_at,
        };
        let tags = tag_rows(row.id, &question.tags);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(questions::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !tags.is_empty() {
                    diesel::insert_into(question_tags::table)
                        .values(&tags)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_question_error)
    }

    async fn update(
        &self,
        id: &QuestionId,
        draft: &QuestionDraft,
    ) -> Result<(), QuestionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| QuestionRepositoryError::connection(pool_error_message(err)))?;
        let question_id = *id.as_uuid();
        let changes = QuestionUpdate {
            title: &draft.title,
            body: draft.body.as_deref(),
            scope: draft.scope.as_str(),
        };
        let tags = tag_rows(question_id, &draft.tags);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::update(questions::table.filter(questions::id.eq(question_id)))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                diesel::delete(question_tags::table.filter(question_tags::question_id.eq(question_id)))
                    .execute(conn)
                    .await?;
                if !tags.is_empty() {
                    diesel::insert_into(question_tags::table)
                        .values(&tags)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_question_error)
    }

    async fn deactivate(&self, id: &QuestionId) -> Result<(), QuestionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| QuestionRepositoryError::connection(pool_error_message(err)))?;
        diesel::update(questions::table.filter(questions::id.eq(id.as_uuid())))
            .set(questions::is_active.eq(false))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_question_error)
    }

    async fn has_active_answers(&self, id: &QuestionId) -> Result<bool, QuestionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| QuestionRepositoryError::connection(pool_error_message(err)))?;
        diesel::select(diesel::dsl::exists(
            answers::table
                .filter(answers::question_id.eq(id.as_uuid()))
                .filter(answers::is_active.eq(true)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_question_error)
    }
}

/// Diesel-backed answer store.
#[derive(Clone)]
pub struct DieselAnswerRepository {
    pool: DbPool,
}

impl DieselAnswerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_answer_error(error: diesel::result::Error) -> AnswerRepositoryError {
    match classify(error) {
        DieselFailure::Connection => AnswerRepositoryError::connection("database connection error"),
        DieselFailure::ForeignKey { .. } => AnswerRepositoryError::query("unknown question"),
        DieselFailure::Unique { .. } => AnswerRepositoryError::query("duplicate row"),
        DieselFailure::Query(message) => AnswerRepositoryError::query(message),
    }
}

async fn hydrate_answers(
    conn: &mut AsyncPgConnection,
    rows: Vec<AnswerRow>,
    viewer: &UserId,
) -> QueryResult<Vec<AnswerView>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let tally = answer_tally(conn, &ids, *viewer.as_uuid()).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let (votes, has_voted) = tally.for_id(&row.id);
            AnswerView {
                answer: Answer {
                    id: AnswerId::from(row.id),
                    question_id: QuestionId::from(row.question_id),
                    owner: UserId::from(row.user_id),
                    body: row.body,
                    is_active: row.is_active,
                    created_at: row.created_at,
                },
                votes,
                has_voted,
            }
        })
        .collect())
}

#[async_trait]
impl AnswerRepository for DieselAnswerRepository {
    async fn list_visible(
        &self,
        question_id: &QuestionId,
        viewer: &UserId,
    ) -> Result<Vec<AnswerView>, AnswerRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AnswerRepositoryError::connection(pool_error_message(err)))?;
        let rows: Vec<AnswerRow> = visible_answers()
            .filter(answers::question_id.eq(question_id.as_uuid()))
            .order((answers::created_at.desc(), answers::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_answer_error)?;
        hydrate_answers(&mut conn, rows, viewer)
            .await
            .map_err(map_answer_error)
    }

    async fn find_visible(
        &self,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        viewer: &UserId,
    ) -> Result<Option<AnswerView>, AnswerRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AnswerRepositoryError::connection(pool_error_message(err)))?;
        let rows: Vec<AnswerRow> = visible_answers()
            .filter(answers::id.eq(answer_id.as_uuid()))
            .filter(answers::question_id.eq(question_id.as_uuid()))
            .load(&mut conn)
            .await
            .map_err(map_answer_error)?;
        let views = hydrate_answers(&mut conn, rows, viewer)
            .await
            .map_err(map_answer_error)?;
        Ok(views.into_iter().next())
    }

    async fn insert(&self, answer: &Answer) -> Result<(), AnswerRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AnswerRepositoryError::connection(pool_error_message(err)))?;
        let row = NewAnswerRow {
            id: *answer.id.as_uuid(),
            question_id: *answer.question_id.as_uuid(),
            user_id: *answer.owner.as_uuid(),
            body: &answer.body,
            is_active: answer.is_active,
            created_at: answer.created_at,
        };
        diesel::insert_into(answers::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_answer_error)
    }

    async fn update_body(&self, id: &AnswerId, body: &str) -> Result<(), AnswerRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AnswerRepositoryError::connection(pool_error_message(err)))?;
        diesel::update(answers::table.filter(answers::id.eq(id.as_uuid())))
            .set(answers::body.eq(body))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_answer_error)
    }

    async fn deactivate(&self, id: &AnswerId) -> Result<(), AnswerRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AnswerRepositoryError::connection(pool_error_message(err)))?;
        diesel::update(answers::table.filter(answers::id.eq(id.as_uuid())))
            .set(answers::is_active.eq(false))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_answer_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("grad_year", Scope::GradYear)]
    #[case("branch_grad_year", Scope::BranchGradYear)]
    #[case("everyone", Scope::College)]
    fn stored_scope_falls_back_to_college(#[case] raw: &str, #[case] expected: Scope) {
        assert_eq!(parse_scope(raw, Uuid::nil()), expected);
    }

    #[rstest]
    fn tag_rows_follow_draft_order() {
        let tags = vec![TagSlug::from_trusted("cse"), TagSlug::from_trusted("general")];
        let rows = tag_rows(Uuid::nil(), &tags);
        let slugs: Vec<&str> = rows.iter().map(|row| row.tag_slug).collect();
        assert_eq!(slugs, ["cse", "general"]);
    }
}
