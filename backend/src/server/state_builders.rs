//! Wiring of repository adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use campus_qa::domain::EmailPolicy;
use campus_qa::inbound::http::state::{HttpState, Repositories, ServiceSettings};
use campus_qa::outbound::memory::InMemoryStore;
use campus_qa::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselAnswerRepository, DieselDepartmentRepository,
    DieselFlagRepository, DieselQuestionRepository, DieselVoteRepository,
};
use campus_qa::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Which store backs the running server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    #[cfg_attr(
        not(feature = "metrics"),
        expect(dead_code, reason = "only reported through the metrics gauge")
    )]
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

fn settings(email_policy: EmailPolicy) -> ServiceSettings<Argon2PasswordHasher> {
    ServiceSettings {
        hasher: Arc::new(Argon2PasswordHasher),
        email_policy,
        clock: Arc::new(DefaultClock),
    }
}

fn postgres_state(pool: &DbPool, email_policy: EmailPolicy) -> HttpState {
    HttpState::from_repositories(
        Repositories {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            departments: Arc::new(DieselDepartmentRepository::new(pool.clone())),
            questions: Arc::new(DieselQuestionRepository::new(pool.clone())),
            answers: Arc::new(DieselAnswerRepository::new(pool.clone())),
            votes: Arc::new(DieselVoteRepository::new(pool.clone())),
            flags: Arc::new(DieselFlagRepository::new(pool.clone())),
        },
        settings(email_policy),
    )
}

fn memory_state(email_policy: EmailPolicy) -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    HttpState::from_repositories(
        Repositories {
            accounts: store.clone(),
            departments: store.clone(),
            questions: store.clone(),
            answers: store.clone(),
            votes: store.clone(),
            flags: store,
        },
        settings(email_policy),
    )
}

/// Build handler state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(crate) fn build_http_state(config: &ServerConfig) -> (web::Data<HttpState>, StoreKind) {
    let policy = config.email_policy.clone();
    match &config.db_pool {
        Some(pool) => {
            info!("serving from PostgreSQL");
            (web::Data::new(postgres_state(pool, policy)), StoreKind::Postgres)
        }
        None => {
            warn!("no database configured; data lives in memory and is lost on restart");
            (web::Data::new(memory_state(policy)), StoreKind::Memory)
        }
    }
}
