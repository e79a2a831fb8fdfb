//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    answer_flags, answer_votes, answers, departments, question_flags, question_tags,
    question_votes, questions, users,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DepartmentRow {
    pub id: i32,
    pub code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Account models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table, hash included.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub grad_year: i32,
    pub roll_number: String,
    pub phone: String,
    pub department_id: i32,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub last_name: &'a str,
    pub date_of_birth: NaiveDate,
    pub grad_year: i32,
    pub roll_number: &'a str,
    pub phone: &'a str,
    pub department_id: i32,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Full profile replacement. `middle_name` is written even when `None` so a
/// cleared middle name is persisted as NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileUpdate<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub last_name: &'a str,
    pub date_of_birth: NaiveDate,
    pub grad_year: i32,
    pub roll_number: &'a str,
    pub phone: &'a str,
    pub department_id: i32,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Question and answer models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuestionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub scope: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = questions)]
pub(crate) struct NewQuestionRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub body: Option<&'a str>,
    pub scope: &'a str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = questions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct QuestionUpdate<'a> {
    pub title: &'a str,
    pub body: Option<&'a str>,
    pub scope: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = question_tags)]
pub(crate) struct NewQuestionTagRow<'a> {
    pub question_id: Uuid,
    pub tag_slug: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnswerRow {
    pub id: Uuid,
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = answers)]
pub(crate) struct NewAnswerRow<'a> {
    pub id: Uuid,
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub body: &'a str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Moderation ledgers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = question_votes)]
pub(crate) struct NewQuestionVoteRow {
    pub question_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = answer_votes)]
pub(crate) struct NewAnswerVoteRow {
    pub answer_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = question_flags)]
pub(crate) struct NewQuestionFlagRow<'a> {
    pub id: Uuid,
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub reason: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = answer_flags)]
pub(crate) struct NewAnswerFlagRow<'a> {
    pub id: Uuid,
    pub answer_id: Uuid,
    pub user_id: Uuid,
    pub reason: &'a str,
    pub created_at: DateTime<Utc>,
}
