//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Reference list of academic departments.
    departments (id) {
        id -> Int4,
        code -> Varchar,
        name -> Varchar,
    }
}

diesel::table! {
    /// Registered accounts. Email, username, roll number and phone are unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        username -> Varchar,
        first_name -> Varchar,
        middle_name -> Nullable<Varchar>,
        last_name -> Varchar,
        date_of_birth -> Date,
        grad_year -> Int4,
        roll_number -> Varchar,
        phone -> Varchar,
        department_id -> Int4,
        /// Argon2 PHC string; never leaves the persistence layer except for
        /// credential checks.
        password_hash -> Text,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (slug) {
        slug -> Varchar,
        description -> Text,
    }
}

diesel::table! {
    questions (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        body -> Nullable<Text>,
        scope -> Varchar,
        /// Soft-delete marker.
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    question_tags (question_id, tag_slug) {
        question_id -> Uuid,
        tag_slug -> Varchar,
    }
}

diesel::table! {
    question_votes (question_id, user_id) {
        question_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    question_flags (id) {
        id -> Uuid,
        question_id -> Uuid,
        user_id -> Uuid,
        reason -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    answers (id) {
        id -> Uuid,
        question_id -> Uuid,
        user_id -> Uuid,
        body -> Text,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    answer_votes (answer_id, user_id) {
        answer_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    answer_flags (id) {
        id -> Uuid,
        answer_id -> Uuid,
        user_id -> Uuid,
        reason -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(users -> departments (department_id));
diesel::joinable!(questions -> users (user_id));
diesel::joinable!(question_tags -> questions (question_id));
diesel::joinable!(question_tags -> tags (tag_slug));
diesel::joinable!(question_votes -> questions (question_id));
diesel::joinable!(question_flags -> questions (question_id));
diesel::joinable!(answers -> questions (question_id));
diesel::joinable!(answer_votes -> answers (answer_id));
diesel::joinable!(answer_flags -> answers (answer_id));

diesel::allow_tables_to_appear_in_same_query!(
    departments,
    users,
    tags,
    questions,
    question_tags,
    question_votes,
    question_flags,
    answers,
    answer_votes,
    answer_flags,
);
