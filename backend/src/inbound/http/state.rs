//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, AccountQuery, AnswerCommand, AnswerQuery, AnswerRepository,
    AccountRepository, DepartmentRepository, FlagCommand, FlagRepository, LoginService,
    PasswordHasher, QuestionCommand, QuestionQuery, QuestionRepository, VoteCommand,
    VoteRepository,
};
use crate::domain::{
    AccountService, AnswerService, EmailPolicy, FlagService, QuestionService, VoteService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub questions: Arc<dyn QuestionCommand>,
    pub questions_query: Arc<dyn QuestionQuery>,
    pub answers: Arc<dyn AnswerCommand>,
    pub answers_query: Arc<dyn AnswerQuery>,
    pub votes: Arc<dyn VoteCommand>,
    pub flags: Arc<dyn FlagCommand>,
}

/// Driven adapters the services are built over.
///
/// A single store may back several ports, in which case the same `Arc` is
/// passed for each of them.
pub struct Repositories<A, D, Q, N, V, F> {
    pub accounts: Arc<A>,
    pub departments: Arc<D>,
    pub questions: Arc<Q>,
    pub answers: Arc<N>,
    pub votes: Arc<V>,
    pub flags: Arc<F>,
}

/// Settings shared by every service instance.
#[derive(Clone)]
pub struct ServiceSettings<H> {
    pub hasher: Arc<H>,
    pub email_policy: EmailPolicy,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire the domain services over the given adapters.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use campus_qa::domain::EmailPolicy;
    /// use campus_qa::inbound::http::state::{HttpState, Repositories, ServiceSettings};
    /// use campus_qa::outbound::memory::InMemoryStore;
    /// use campus_qa::outbound::security::Argon2PasswordHasher;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let state = HttpState::from_repositories(
    ///     Repositories {
    ///         accounts: store.clone(),
    ///         departments: store.clone(),
    ///         questions: store.clone(),
    ///         answers: store.clone(),
    ///         votes: store.clone(),
    ///         flags: store,
    ///     },
    ///     ServiceSettings {
    ///         hasher: Arc::new(Argon2PasswordHasher),
    ///         email_policy: EmailPolicy::default(),
    ///         clock: Arc::new(DefaultClock),
    ///     },
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn from_repositories<A, D, Q, N, V, F, H>(
        repos: Repositories<A, D, Q, N, V, F>,
        settings: ServiceSettings<H>,
    ) -> Self
    where
        A: AccountRepository + 'static,
        D: DepartmentRepository + 'static,
        Q: QuestionRepository + 'static,
        N: AnswerRepository + 'static,
        V: VoteRepository + 'static,
        F: FlagRepository + 'static,
        H: PasswordHasher + 'static,
    {
        let ServiceSettings {
            hasher,
            email_policy,
            clock,
        } = settings;
        let accounts = Arc::new(AccountService::new(
            repos.accounts,
            repos.departments,
            hasher,
            email_policy,
            clock.clone(),
        ));
        let questions = Arc::new(QuestionService::new(repos.questions.clone(), clock.clone()));
        let answers = Arc::new(AnswerService::new(
            repos.questions,
            repos.answers,
            clock.clone(),
        ));

        Self {
            login: accounts.clone(),
            accounts: accounts.clone(),
            accounts_query: accounts,
            questions: questions.clone(),
            questions_query: questions,
            answers: answers.clone(),
            answers_query: answers,
            votes: Arc::new(VoteService::new(repos.votes)),
            flags: Arc::new(FlagService::new(repos.flags, clock)),
        }
    }
}
