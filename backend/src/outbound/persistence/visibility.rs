//! Visibility filters and per-viewer vote aggregation shared by the question
//! and answer adapters.
//!
//! Content is visible when `is_active` is true and no flag row references
//! it. The filter is expressed as a correlated `NOT EXISTS` so it runs inside
//! the same statement as the read.

use std::collections::{HashMap, HashSet};

use diesel::dsl::{AsSelect, SqlTypeOf, count_star, exists, not};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::models::{AnswerRow, QuestionRow};
use super::schema::{answer_flags, answer_votes, answers, question_flags, question_votes, questions};

/// Boxed `SELECT` over visible questions.
pub(crate) fn visible_questions<'a>()
-> questions::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<QuestionRow, Pg>>> {
    questions::table
        .filter(questions::is_active.eq(true))
        .filter(not(exists(
            question_flags::table.filter(question_flags::question_id.eq(questions::id)),
        )))
        .select(QuestionRow::as_select())
        .into_boxed()
}

/// Boxed `SELECT` over visible answers.
pub(crate) fn visible_answers<'a>()
-> answers::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<AnswerRow, Pg>>> {
    answers::table
        .filter(answers::is_active.eq(true))
        .filter(not(exists(
            answer_flags::table.filter(answer_flags::answer_id.eq(answers::id)),
        )))
        .select(AnswerRow::as_select())
        .into_boxed()
}

/// Vote count per content id plus the subset the viewer has voted on.
#[derive(Debug, Default)]
pub(crate) struct VoteTally {
    counts: HashMap<Uuid, i64>,
    voted: HashSet<Uuid>,
}

impl VoteTally {
    /// `(votes, has_voted)` for one content id.
    pub(crate) fn for_id(&self, id: &Uuid) -> (i64, bool) {
        (
            self.counts.get(id).copied().unwrap_or(0),
            self.voted.contains(id),
        )
    }
}

pub(crate) async fn question_tally(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
    viewer: Uuid,
) -> QueryResult<VoteTally> {
    if ids.is_empty() {
        return Ok(VoteTally::default());
    }
    let counts: Vec<(Uuid, i64)> = question_votes::table
        .filter(question_votes::question_id.eq_any(ids))
        .group_by(question_votes::question_id)
        .select((question_votes::question_id, count_star()))
        .load(conn)
        .await?;
    let voted: Vec<Uuid> = question_votes::table
        .filter(question_votes::question_id.eq_any(ids))
        .filter(question_votes::user_id.eq(viewer))
        .select(question_votes::question_id)
        .load(conn)
        .await?;
    Ok(VoteTally {
        counts: counts.into_iter().collect(),
        voted: voted.into_iter().collect(),
    })
}

pub(crate) async fn answer_tally(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
    viewer: Uuid,
) -> QueryResult<VoteTally> {
    if ids.is_empty() {
        return Ok(VoteTally::default());
    }
    let counts: Vec<(Uuid, i64)> = answer_votes::table
        .filter(answer_votes::answer_id.eq_any(ids))
        .group_by(answer_votes::answer_id)
        .select((answer_votes::answer_id, count_star()))
        .load(conn)
        .await?;
    let voted: Vec<Uuid> = answer_votes::table
        .filter(answer_votes::answer_id.eq_any(ids))
        .filter(answer_votes::user_id.eq(viewer))
        .select(answer_votes::answer_id)
        .load(conn)
        .await?;
    Ok(VoteTally {
        counts: counts.into_iter().collect(),
        voted: voted.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use rstest::rstest;

    #[rstest]
    fn question_filter_excludes_flagged_and_inactive_rows() {
        let sql = debug_query::<Pg, _>(&visible_questions()).to_string();

        assert!(sql.contains("\"questions\".\"is_active\" = $1"), "{sql}");
        assert!(sql.contains("NOT") && sql.contains("EXISTS"), "{sql}");
        assert!(sql.contains("\"question_flags\""), "{sql}");
    }

    #[rstest]
    fn answer_filter_excludes_flagged_and_inactive_rows() {
        let sql = debug_query::<Pg, _>(&visible_answers()).to_string();

        assert!(sql.contains("\"answers\".\"is_active\" = $1"), "{sql}");
        assert!(sql.contains("\"answer_flags\""), "{sql}");
    }

    #[rstest]
    fn tally_defaults_to_zero_and_not_voted() {
        let tally = VoteTally::default();
        assert_eq!(tally.for_id(&Uuid::nil()), (0, false));
    }
}
