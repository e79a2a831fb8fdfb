//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`]) are what inbound
//! adapters call. Driven ports (`*Repository`, [`PasswordHasher`]) are what
//! outbound adapters implement; each exposes a typed error enum generated by
//! `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod answer_repository;
mod department_repository;
mod flag_repository;
mod moderation_command;
mod password_hasher;
mod question_command;
mod question_repository;
mod vote_repository;

pub use account_command::{
    AccountAdministration, AccountCommand, AccountQuery, LoginService, RegisterAccountRequest,
};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use answer_repository::MockAnswerRepository;
pub use answer_repository::{AnswerRepository, AnswerRepositoryError};
#[cfg(test)]
pub use department_repository::MockDepartmentRepository;
pub use department_repository::{DepartmentRepository, DepartmentRepositoryError};
#[cfg(test)]
pub use flag_repository::MockFlagRepository;
pub use flag_repository::{FlagRepository, FlagRepositoryError};
pub use moderation_command::{FlagCommand, VoteCommand};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use question_command::{AnswerCommand, AnswerQuery, QuestionCommand, QuestionInput, QuestionQuery};
#[cfg(test)]
pub use question_repository::MockQuestionRepository;
pub use question_repository::{QuestionRepository, QuestionRepositoryError};
#[cfg(test)]
pub use vote_repository::MockVoteRepository;
pub use vote_repository::{VoteRepository, VoteRepositoryError};
