//! PostgreSQL persistence adapters using Diesel.
//!
//! Each repository is a thin translation between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module.
//!
//! ```ignore
//! use campus_qa::outbound::persistence::{DbPool, DieselQuestionRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campus_qa")).await?;
//! let questions = DieselQuestionRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_moderation_repository;
mod diesel_question_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;
mod visibility;

pub use diesel_account_repository::{DieselAccountRepository, DieselDepartmentRepository};
pub use diesel_moderation_repository::{DieselFlagRepository, DieselVoteRepository};
pub use diesel_question_repository::{DieselAnswerRepository, DieselQuestionRepository};
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
