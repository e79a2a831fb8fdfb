//! Questions and answers.
//!
//! Content is never removed: deletion clears `is_active`, and any flag hides
//! the item from every read path. [`ContentState::is_visible`] is the single
//! statement of that rule for in-process adapters; the SQL adapter mirrors it
//! in its visibility query fragment.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum length of a question title.
pub const TITLE_MAX: usize = 500;

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

content_id! {
    /// Question identifier.
    QuestionId
}

content_id! {
    /// Answer identifier.
    AnswerId
}

/// Kind of votable, flaggable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Question,
    Answer,
}

impl ContentKind {
    /// Capitalised label used in client-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Question => "Question",
            Self::Answer => "Answer",
        }
    }
}

/// Identifier of a question or an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentRef {
    Question(QuestionId),
    Answer(AnswerId),
}

impl ContentRef {
    pub fn kind(self) -> ContentKind {
        match self {
            Self::Question(_) => ContentKind::Question,
            Self::Answer(_) => ContentKind::Answer,
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        match self {
            Self::Question(id) => id.as_uuid(),
            Self::Answer(id) => id.as_uuid(),
        }
    }
}

/// Declared audience tier of a question. Stored and returned, never enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    BranchGradYear,
    GradYear,
    #[default]
    College,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BranchGradYear => "branch_grad_year",
            Self::GradYear => "grad_year",
            Self::College => "college",
        }
    }

    /// Parse the stored textual form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "branch_grad_year" => Some(Self::BranchGradYear),
            "grad_year" => Some(Self::GradYear),
            "college" => Some(Self::College),
            _ => None,
        }
    }
}

/// Tag slug, lower-case and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSlug(String);

impl TagSlug {
    pub fn new(raw: impl Into<String>) -> Result<Self, ContentValidationError> {
        let raw = raw.into();
        let slug = raw.trim().to_lowercase();
        if slug.is_empty() {
            return Err(ContentValidationError::BlankTag);
        }
        Ok(Self(slug))
    }

    /// Rehydrate a stored slug without re-validation.
    pub fn from_trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for TagSlug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TagSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Validation errors for question and answer drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentValidationError {
    #[error("title must not be blank")]
    BlankTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("body must not be blank")]
    BlankBody,
    #[error("tag slugs must not be blank")]
    BlankTag,
}

impl ContentValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankTitle | Self::TitleTooLong { .. } => "title",
            Self::BlankBody => "body",
            Self::BlankTag => "tags",
        }
    }
}

/// Validated question fields supplied by the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub title: String,
    pub body: Option<String>,
    pub scope: Scope,
    pub tags: Vec<TagSlug>,
}

impl QuestionDraft {
    /// Validate author input. Duplicate tags collapse to one.
    ///
    /// # Examples
    /// ```
    /// use campus_qa::domain::{QuestionDraft, Scope};
    ///
    /// let draft = QuestionDraft::try_new("Where is block C?", None, None, vec!["general".into()])
    ///     .expect("valid draft");
    /// assert_eq!(draft.scope, Scope::College);
    /// ```
    pub fn try_new(
        title: &str,
        body: Option<String>,
        scope: Option<Scope>,
        tags: Vec<String>,
    ) -> Result<Self, ContentValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ContentValidationError::BlankTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(ContentValidationError::TitleTooLong { max: TITLE_MAX });
        }
        let mut slugs = tags
            .into_iter()
            .map(TagSlug::new)
            .collect::<Result<Vec<_>, _>>()?;
        slugs.sort();
        slugs.dedup();
        Ok(Self {
            title: title.to_owned(),
            body: body.filter(|b| !b.trim().is_empty()),
            scope: scope.unwrap_or_default(),
            tags: slugs,
        })
    }
}

/// Validated answer body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDraft {
    pub body: String,
}

impl AnswerDraft {
    pub fn try_new(body: &str) -> Result<Self, ContentValidationError> {
        if body.trim().is_empty() {
            return Err(ContentValidationError::BlankBody);
        }
        Ok(Self {
            body: body.to_owned(),
        })
    }
}

/// Moderation-relevant state of a content row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentState {
    pub is_active: bool,
    pub flag_count: usize,
}

impl ContentState {
    /// Visible iff active and never flagged.
    pub fn is_visible(self) -> bool {
        self.is_active && self.flag_count == 0
    }
}

/// Stored question record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub owner: UserId,
    pub title: String,
    pub body: Option<String>,
    pub scope: Scope,
    pub tags: Vec<TagSlug>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Question as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub question: Question,
    pub votes: i64,
    pub has_voted: bool,
}

/// Stored answer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub owner: UserId,
    pub body: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Answer as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerView {
    pub answer: Answer,
    pub votes: i64,
    pub has_voted: bool,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, 0, true)]
    #[case(false, 0, false)]
    #[case(true, 1, false)]
    #[case(false, 3, false)]
    fn visibility_requires_active_and_unflagged(
        #[case] is_active: bool,
        #[case] flag_count: usize,
        #[case] expected: bool,
    ) {
        let state = ContentState {
            is_active,
            flag_count,
        };
        assert_eq!(state.is_visible(), expected);
    }

    #[rstest]
    fn question_draft_normalises_tags_and_scope() {
        let draft = QuestionDraft::try_new(
            "  How do I apply for hostel?  ",
            Some("  ".into()),
            None,
            vec!["CSE".into(), "general".into(), "cse".into()],
        )
        .expect("valid draft");
        assert_eq!(draft.title, "How do I apply for hostel?");
        assert!(draft.body.is_none());
        assert_eq!(draft.scope, Scope::College);
        assert_eq!(
            draft.tags,
            vec![TagSlug::from_trusted("cse"), TagSlug::from_trusted("general")]
        );
    }

    #[rstest]
    #[case("", ContentValidationError::BlankTitle)]
    #[case("   ", ContentValidationError::BlankTitle)]
    fn question_draft_rejects_blank_title(
        #[case] title: &str,
        #[case] expected: ContentValidationError,
    ) {
        let err = QuestionDraft::try_new(title, None, None, vec![]).expect_err("blank title");
        assert_eq!(err, expected);
        assert_eq!(err.field(), "title");
    }

    #[rstest]
    fn question_draft_rejects_long_title() {
        let title = "q".repeat(TITLE_MAX + 1);
        let err = QuestionDraft::try_new(&title, None, None, vec![]).expect_err("long title");
        assert_eq!(err, ContentValidationError::TitleTooLong { max: TITLE_MAX });
    }

    #[rstest]
    fn answer_draft_requires_body() {
        assert_eq!(
            AnswerDraft::try_new(" "),
            Err(ContentValidationError::BlankBody)
        );
        assert!(AnswerDraft::try_new("Go to the admin office").is_ok());
    }

    #[rstest]
    #[case(Scope::BranchGradYear)]
    #[case(Scope::GradYear)]
    #[case(Scope::College)]
    fn scope_text_is_stable(#[case] scope: Scope) {
        assert_eq!(Scope::parse(scope.as_str()), Some(scope));
    }
}
