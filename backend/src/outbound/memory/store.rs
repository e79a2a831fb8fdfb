//! Mutex-guarded state and the repository implementations over it.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AnswerRepository, AnswerRepositoryError,
    DepartmentRepository, DepartmentRepositoryError, FlagRepository, FlagRepositoryError,
    QuestionRepository, QuestionRepositoryError, VoteRepository, VoteRepositoryError,
};
use crate::domain::{
    Account, AccountCredentials, AccountProfile, Answer, AnswerId, AnswerView, ContentRef,
    ContentState, Department, DepartmentId, Flag, NewAccount, Question, QuestionDraft,
    QuestionId, QuestionView, RollNumber, TagSlug, UserId,
};

use super::{SEED_DEPARTMENTS, SEED_TAGS};

#[derive(Debug)]
struct StoredAccount {
    account: Account,
    password_hash: String,
}

#[derive(Debug, Default)]
struct State {
    departments: Vec<Department>,
    tags: HashSet<String>,
    accounts: Vec<StoredAccount>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    votes: HashMap<ContentRef, BTreeSet<UserId>>,
    flags: HashMap<ContentRef, Vec<Flag>>,
}

impl State {
    fn seeded() -> Self {
        Self {
            departments: SEED_DEPARTMENTS
                .iter()
                .map(|(id, code, name)| Department {
                    id: DepartmentId::new(*id),
                    code: (*code).to_owned(),
                    name: (*name).to_owned(),
                })
                .collect(),
            tags: SEED_TAGS.iter().map(|slug| (*slug).to_owned()).collect(),
            ..Self::default()
        }
    }

    fn state_of(&self, target: ContentRef, is_active: bool) -> ContentState {
        ContentState {
            is_active,
            flag_count: self.flags.get(&target).map_or(0, Vec::len),
        }
    }

    fn vote_data(&self, target: ContentRef, viewer: &UserId) -> (i64, bool) {
        self.votes.get(&target).map_or((0, false), |voters| {
            (voters.len() as i64, voters.contains(viewer))
        })
    }

    fn question_visible(&self, question: &Question) -> bool {
        self.state_of(ContentRef::Question(question.id), question.is_active)
            .is_visible()
    }

    fn answer_visible(&self, answer: &Answer) -> bool {
        self.state_of(ContentRef::Answer(answer.id), answer.is_active)
            .is_visible()
    }

    fn question_view(&self, question: &Question, viewer: &UserId) -> QuestionView {
        let (votes, has_voted) = self.vote_data(ContentRef::Question(question.id), viewer);
        QuestionView {
            question: question.clone(),
            votes,
            has_voted,
        }
    }

    fn answer_view(&self, answer: &Answer, viewer: &UserId) -> AnswerView {
        let (votes, has_voted) = self.vote_data(ContentRef::Answer(answer.id), viewer);
        AnswerView {
            answer: answer.clone(),
            votes,
            has_voted,
        }
    }

    /// Whether the target exists with `is_active = true`, ignoring flags.
    fn target_active(&self, target: ContentRef) -> bool {
        match target {
            ContentRef::Question(id) => self.questions.iter().any(|q| q.id == id && q.is_active),
            ContentRef::Answer(id) => self.answers.iter().any(|a| a.id == id && a.is_active),
        }
    }

    /// First unique field of `profile` already used by an account other than
    /// `except`.
    fn duplicate_field(&self, profile: &AccountProfile, except: Option<&UserId>) -> Option<&'static str> {
        let others = self
            .accounts
            .iter()
            .filter(|stored| Some(&stored.account.id) != except)
            .map(|stored| &stored.account.profile);
        for other in others {
            if other.email == profile.email {
                return Some("email");
            }
            if other.username == profile.username {
                return Some("username");
            }
            if other.roll_number == profile.roll_number {
                return Some("rollNumber");
            }
            if other.phone == profile.phone {
                return Some("phone");
            }
        }
        None
    }
}

/// Newest first; equal timestamps keep the later insertion first.
fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.reverse();
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

/// Thread-safe in-memory store seeded with reference departments and tags.
#[derive(Debug)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::seeded()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let state = self.lock().map_err(DepartmentRepositoryError::query)?;
        Ok(state.departments.clone())
    }

    async fn exists(&self, id: DepartmentId) -> Result<bool, DepartmentRepositoryError> {
        let state = self.lock().map_err(DepartmentRepositoryError::query)?;
        Ok(state.departments.iter().any(|d| d.id == id))
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn insert(&self, account: &NewAccount) -> Result<(), AccountRepositoryError> {
        let mut state = self.lock().map_err(AccountRepositoryError::query)?;
        if let Some(field) = state.duplicate_field(&account.profile, None) {
            return Err(AccountRepositoryError::duplicate(field));
        }
        state.accounts.push(StoredAccount {
            account: Account {
                id: account.id,
                profile: account.profile.clone(),
                flags: account.flags,
                created_at: account.created_at,
            },
            password_hash: account.password_hash.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock().map_err(AccountRepositoryError::query)?;
        Ok(state
            .accounts
            .iter()
            .find(|stored| stored.account.id == *id)
            .map(|stored| stored.account.clone()))
    }

    async fn find_credentials(
        &self,
        roll_number: &str,
    ) -> Result<Option<AccountCredentials>, AccountRepositoryError> {
        let state = self.lock().map_err(AccountRepositoryError::query)?;
        Ok(state
            .accounts
            .iter()
            .find(|stored| stored.account.profile.roll_number.as_ref() == roll_number)
            .map(|stored| AccountCredentials {
                account: stored.account.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &AccountProfile,
        password_hash: &str,
    ) -> Result<bool, AccountRepositoryError> {
        let mut state = self.lock().map_err(AccountRepositoryError::query)?;
        if let Some(field) = state.duplicate_field(profile, Some(id)) {
            return Err(AccountRepositoryError::duplicate(field));
        }
        let Some(stored) = state
            .accounts
            .iter_mut()
            .find(|stored| stored.account.id == *id)
        else {
            return Ok(false);
        };
        stored.account.profile = profile.clone();
        stored.password_hash = password_hash.to_owned();
        Ok(true)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, AccountRepositoryError> {
        let mut state = self.lock().map_err(AccountRepositoryError::query)?;
        if !state.accounts.iter().any(|stored| stored.account.id == *id) {
            return Ok(false);
        }
        let owns_content = state.questions.iter().any(|q| q.owner == *id)
            || state.answers.iter().any(|a| a.owner == *id);
        if owns_content {
            return Err(AccountRepositoryError::in_use());
        }
        state.accounts.retain(|stored| stored.account.id != *id);
        for voters in state.votes.values_mut() {
            voters.remove(id);
        }
        for flags in state.flags.values_mut() {
            flags.retain(|flag| flag.user != *id);
        }
        state.flags.retain(|_, flags| !flags.is_empty());
        Ok(true)
    }

    async fn set_active(
        &self,
        roll_number: &RollNumber,
        active: bool,
    ) -> Result<bool, AccountRepositoryError> {
        let mut state = self.lock().map_err(AccountRepositoryError::query)?;
        let Some(stored) = state
            .accounts
            .iter_mut()
            .find(|stored| stored.account.profile.roll_number == *roll_number)
        else {
            return Ok(false);
        };
        stored.account.flags.is_active = active;
        Ok(true)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryStore {
    async fn list_visible(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<QuestionView>, QuestionRepositoryError> {
        let state = self.lock().map_err(QuestionRepositoryError::query)?;
        let mut views: Vec<QuestionView> = state
            .questions
            .iter()
            .filter(|q| state.question_visible(q))
            .map(|q| state.question_view(q, viewer))
            .collect();
        newest_first(&mut views, |view| view.question.created_at);
        Ok(views)
    }

    async fn find_visible(
        &self,
        id: &QuestionId,
        viewer: &UserId,
    ) -> Result<Option<QuestionView>, QuestionRepositoryError> {
        let state = self.lock().map_err(QuestionRepositoryError::query)?;
        Ok(state
            .questions
            .iter()
            .find(|q| q.id == *id && state.question_visible(q))
            .map(|q| state.question_view(q, viewer)))
    }

    async fn missing_tags(
        &self,
        slugs: &[TagSlug],
    ) -> Result<Vec<TagSlug>, QuestionRepositoryError> {
        let state = self.lock().map_err(QuestionRepositoryError::query)?;
        Ok(slugs
            .iter()
            .filter(|slug| !state.tags.contains(slug.as_ref()))
            .cloned()
            .collect())
    }

    async fn insert(&self, question: &Question) -> Result<(), QuestionRepositoryError> {
        let mut state = self.lock().map_err(QuestionRepositoryError::query)?;
        state.questions.push(question.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: &QuestionId,
        draft: &QuestionDraft,
    ) -> Result<(), QuestionRepositoryError> {
        let mut state = self.lock().map_err(QuestionRepositoryError::query)?;
        if let Some(question) = state.questions.iter_mut().find(|q| q.id == *id) {
            question.title = draft.title.clone();
            question.body = draft.body.clone();
            question.scope = draft.scope;
            question.tags = draft.tags.clone();
        }
        Ok(())
    }

    async fn deactivate(&self, id: &QuestionId) -> Result<(), QuestionRepositoryError> {
        let mut state = self.lock().map_err(QuestionRepositoryError::query)?;
        if let Some(question) = state.questions.iter_mut().find(|q| q.id == *id) {
            question.is_active = false;
        }
        Ok(())
    }

    async fn has_active_answers(&self, id: &QuestionId) -> Result<bool, QuestionRepositoryError> {
        let state = self.lock().map_err(QuestionRepositoryError::query)?;
        Ok(state
            .answers
            .iter()
            .any(|a| a.question_id == *id && a.is_active))
    }
}

#[async_trait]
impl AnswerRepository for InMemoryStore {
    async fn list_visible(
        &self,
        question_id: &QuestionId,
        viewer: &UserId,
    ) -> Result<Vec<AnswerView>, AnswerRepositoryError> {
        let state = self.lock().map_err(AnswerRepositoryError::query)?;
        let mut views: Vec<AnswerView> = state
            .answers
            .iter()
            .filter(|a| a.question_id == *question_id && state.answer_visible(a))
            .map(|a| state.answer_view(a, viewer))
            .collect();
        newest_first(&mut views, |view| view.answer.created_at);
        Ok(views)
    }

    async fn find_visible(
        &self,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        viewer: &UserId,
    ) -> Result<Option<AnswerView>, AnswerRepositoryError> {
        let state = self.lock().map_err(AnswerRepositoryError::query)?;
        Ok(state
            .answers
            .iter()
            .find(|a| {
                a.id == *answer_id && a.question_id == *question_id && state.answer_visible(a)
            })
            .map(|a| state.answer_view(a, viewer)))
    }

    async fn insert(&self, answer: &Answer) -> Result<(), AnswerRepositoryError> {
        let mut state = self.lock().map_err(AnswerRepositoryError::query)?;
        state.answers.push(answer.clone());
        Ok(())
    }

    async fn update_body(&self, id: &AnswerId, body: &str) -> Result<(), AnswerRepositoryError> {
        let mut state = self.lock().map_err(AnswerRepositoryError::query)?;
        if let Some(answer) = state.answers.iter_mut().find(|a| a.id == *id) {
            body.clone_into(&mut answer.body);
        }
        Ok(())
    }

    async fn deactivate(&self, id: &AnswerId) -> Result<(), AnswerRepositoryError> {
        let mut state = self.lock().map_err(AnswerRepositoryError::query)?;
        if let Some(answer) = state.answers.iter_mut().find(|a| a.id == *id) {
            answer.is_active = false;
        }
        Ok(())
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn cast_vote(
        &self,
        target: ContentRef,
        voter: &UserId,
        upvote: bool,
    ) -> Result<i64, VoteRepositoryError> {
        let mut state = self.lock().map_err(VoteRepositoryError::query)?;
        if !state.target_active(target) {
            return Err(VoteRepositoryError::target_not_found());
        }
        let voters = state.votes.entry(target).or_default();
        if upvote {
            if !voters.insert(*voter) {
                return Err(VoteRepositoryError::already_voted());
            }
        } else if !voters.remove(voter) {
            return Err(VoteRepositoryError::not_voted());
        }
        Ok(voters.len() as i64)
    }
}

#[async_trait]
impl FlagRepository for InMemoryStore {
    async fn insert(&self, flag: &Flag) -> Result<(), FlagRepositoryError> {
        let mut state = self.lock().map_err(FlagRepositoryError::query)?;
        if !state.target_active(flag.target) {
            return Err(FlagRepositoryError::target_not_found());
        }
        let flags = state.flags.entry(flag.target).or_default();
        if flags.iter().any(|existing| existing.user == flag.user) {
            return Err(FlagRepositoryError::duplicate());
        }
        flags.push(flag.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
