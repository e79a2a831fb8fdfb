//! Answer use cases.
//!
//! Every operation first resolves the parent question through the visibility
//! rule, so answers under a deleted or flagged question are unreachable.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{AnswerCommand, AnswerQuery, AnswerRepository, QuestionRepository};
use crate::domain::question_service::{content_validation_error, missing_field, question_not_found};
use crate::domain::repository_errors::{map_answer_error, map_question_error};
use crate::domain::{
    Action, Answer, AnswerDraft, AnswerId, AnswerView, Error, QuestionId, Resource, UserId,
    authorize,
};

/// Answer service implementing the answer driving ports.
#[derive(Clone)]
pub struct AnswerService<Q, A> {
    questions: Arc<Q>,
    answers: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<Q, A> AnswerService<Q, A> {
    pub fn new(questions: Arc<Q>, answers: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            questions,
            answers,
            clock,
        }
    }
}

fn parse_body(body: Option<String>) -> Result<AnswerDraft, Error> {
    let body = body.ok_or_else(|| missing_field("body"))?;
    AnswerDraft::try_new(&body).map_err(|err| content_validation_error(&err))
}

impl<Q, A> AnswerService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn ensure_question(&self, id: &QuestionId, viewer: &UserId) -> Result<(), Error> {
        self.questions
            .find_visible(id, viewer)
            .await
            .map_err(map_question_error)?
            .map(|_| ())
            .ok_or_else(question_not_found)
    }

    async fn load_visible(
        &self,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        viewer: &UserId,
    ) -> Result<AnswerView, Error> {
        self.ensure_question(question_id, viewer).await?;
        self.answers
            .find_visible(question_id, answer_id, viewer)
            .await
            .map_err(map_answer_error)?
            .ok_or_else(|| Error::not_found("Answer does not exist"))
    }

    async fn load_owned(
        &self,
        actor: &UserId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        action: Action,
    ) -> Result<AnswerView, Error> {
        let current = self.load_visible(question_id, answer_id, actor).await?;
        authorize(
            *actor,
            Resource::Content {
                owner: current.answer.owner,
            },
            action,
        )
        .require("Editing answers is restricted to the author only.")?;
        Ok(current)
    }
}

#[async_trait]
impl<Q, A> AnswerQuery for AnswerService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn list(
        &self,
        viewer: &UserId,
        question_id: &QuestionId,
    ) -> Result<Vec<AnswerView>, Error> {
        self.ensure_question(question_id, viewer).await?;
        self.answers
            .list_visible(question_id, viewer)
            .await
            .map_err(map_answer_error)
    }

    async fn get(
        &self,
        viewer: &UserId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<AnswerView, Error> {
        self.load_visible(question_id, answer_id, viewer).await
    }
}

#[async_trait]
impl<Q, A> AnswerCommand for AnswerService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn create(
        &self,
        actor: &UserId,
        question_id: &QuestionId,
        body: Option<String>,
    ) -> Result<AnswerView, Error> {
        self.ensure_question(question_id, actor).await?;
        let AnswerDraft { body } = parse_body(body)?;
        let answer = Answer {
            id: AnswerId::random(),
            question_id: *question_id,
            owner: *actor,
            body,
            is_active: true,
            created_at: self.clock.utc(),
        };
        self.answers
            .insert(&answer)
            .await
            .map_err(map_answer_error)?;
        Ok(AnswerView {
            answer,
            votes: 0,
            has_voted: false,
        })
    }

    async fn update(
        &self,
        actor: &UserId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        body: Option<String>,
    ) -> Result<AnswerView, Error> {
        let mut current = self
            .load_owned(actor, question_id, answer_id, Action::Update)
            .await?;
        let AnswerDraft { body } = parse_body(body)?;
        self.answers
            .update_body(answer_id, &body)
            .await
            .map_err(map_answer_error)?;
        current.answer.body = body;
        Ok(current)
    }

    async fn delete(
        &self,
        actor: &UserId,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<(), Error> {
        self.load_owned(actor, question_id, answer_id, Action::Delete)
            .await?;
        self.answers
            .deactivate(answer_id)
            .await
            .map_err(map_answer_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockAnswerRepository, MockQuestionRepository};
    use crate::domain::{ErrorCode, QuestionView};
    use crate::test_support::{fixture_clock, fixture_timestamp, question};
    use rstest::rstest;

    fn visible_question(owner: UserId) -> MockQuestionRepository {
        let mut questions = MockQuestionRepository::new();
        questions.expect_find_visible().returning(move |_, _| {
            Ok(Some(QuestionView {
                question: question(owner),
                votes: 0,
                has_voted: false,
            }))
        });
        questions
    }

    fn stored_answer(owner: UserId, question_id: QuestionId) -> AnswerView {
        AnswerView {
            answer: Answer {
                id: AnswerId::random(),
                question_id,
                owner,
                body: "Ground floor of block A".into(),
                is_active: true,
                created_at: fixture_timestamp(),
            },
            votes: 1,
            has_voted: true,
        }
    }

    fn service(
        questions: MockQuestionRepository,
        answers: MockAnswerRepository,
    ) -> AnswerService<MockQuestionRepository, MockAnswerRepository> {
        AnswerService::new(Arc::new(questions), Arc::new(answers), fixture_clock())
    }

    #[tokio::test]
    async fn create_binds_owner_and_question() {
        let actor = UserId::random();
        let question_id = QuestionId::random();
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_insert()
            .withf(move |a| a.owner == actor && a.question_id == question_id && a.is_active)
            .times(1)
            .return_once(|_| Ok(()));

        let created = service(visible_question(UserId::random()), answers)
            .create(&actor, &question_id, Some("Try the east gate".into()))
            .await
            .expect("created");
        assert_eq!(created.answer.question_id, question_id);
        assert_eq!(created.votes, 0);
    }

    #[tokio::test]
    async fn create_under_hidden_question_is_not_found() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_find_visible().return_once(|_, _| Ok(None));
        let err = service(questions, MockAnswerRepository::new())
            .create(&UserId::random(), &QuestionId::random(), Some("hi".into()))
            .await
            .expect_err("hidden parent");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   ".to_owned()))]
    #[tokio::test]
    async fn create_requires_body(#[case] body: Option<String>) {
        let err = service(visible_question(UserId::random()), MockAnswerRepository::new())
            .create(&UserId::random(), &QuestionId::random(), body)
            .await
            .expect_err("no body");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden() {
        let question_id = QuestionId::random();
        let stored = stored_answer(UserId::random(), question_id);
        let answer_id = stored.answer.id;
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_find_visible()
            .return_once(move |_, _, _| Ok(Some(stored)));
        answers.expect_update_body().never();

        let err = service(visible_question(UserId::random()), answers)
            .update(&UserId::random(), &question_id, &answer_id, Some("x".into()))
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn delete_by_owner_deactivates() {
        let owner = UserId::random();
        let question_id = QuestionId::random();
        let stored = stored_answer(owner, question_id);
        let answer_id = stored.answer.id;
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_find_visible()
            .return_once(move |_, _, _| Ok(Some(stored)));
        answers
            .expect_deactivate()
            .times(1)
            .return_once(|_| Ok(()));

        service(visible_question(owner), answers)
            .delete(&owner, &question_id, &answer_id)
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn missing_answer_is_not_found() {
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_find_visible()
            .return_once(|_, _, _| Ok(None));
        let err = service(visible_question(UserId::random()), answers)
            .get(&UserId::random(), &QuestionId::random(), &AnswerId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
