//! Domain primitives, ports and services.
//!
//! Purpose: define strongly typed campus Q&A entities, the authorization
//! policy, and the use-case services that sit between inbound and outbound
//! adapters. Nothing in here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Account, AccountProfile, EmailPolicy: account directory types.
//! - Question, Answer, QuestionView, AnswerView: content and per-viewer views.
//! - Flag, FlagReason: moderation ledger entries.
//! - authorize / Resource / Action: ownership policy.
//! - AccountService, QuestionService, AnswerService, VoteService,
//!   FlagService: driving port implementations.

pub mod auth;
pub mod content;
pub mod department;
pub mod error;
pub mod flag;
pub mod policy;
pub mod ports;
pub mod trace_id;
pub mod user;

mod account_service;
mod answer_service;
mod moderation_service;
mod question_service;
mod repository_errors;

pub use self::account_service::AccountService;
pub use self::answer_service::AnswerService;
pub use self::auth::{LoginCredentials, LoginValidationError, Password};
pub use self::content::{
    Answer, AnswerDraft, AnswerId, AnswerView, ContentKind, ContentRef, ContentState,
    ContentValidationError, Question, QuestionDraft, QuestionId, QuestionView, Scope, TITLE_MAX,
    TagSlug,
};
pub use self::department::{Department, DepartmentId};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::flag::{Flag, FlagReason};
pub use self::moderation_service::{FlagService, VoteService};
pub use self::policy::{Action, Decision, Resource, authorize};
pub use self::question_service::QuestionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Account, AccountCredentials, AccountField, AccountFlags, AccountProfile,
    AccountValidationError, DEFAULT_EMAIL_PATTERN, EmailPolicy, GradYear, InstitutionalEmail,
    NAME_MAX, NewAccount, PersonName, PhoneNumber, RegistrationInput, RollNumber, UserId,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use campus_qa::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
