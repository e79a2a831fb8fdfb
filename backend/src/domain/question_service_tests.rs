//! Tests for the question service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::MockQuestionRepository;
use crate::domain::{ErrorCode, Scope, TagSlug};
use crate::test_support::{fixture_clock, fixture_timestamp, question};
use rstest::rstest;
use serde_json::json;

fn make_service(repo: MockQuestionRepository) -> QuestionService<MockQuestionRepository> {
    QuestionService::new(Arc::new(repo), fixture_clock())
}

fn view(question: Question) -> QuestionView {
    QuestionView {
        question,
        votes: 2,
        has_voted: false,
    }
}

fn input(title: &str) -> QuestionInput {
    QuestionInput {
        title: Some(title.into()),
        body: Some("Details".into()),
        scope: Some(Scope::GradYear),
        tags: vec!["general".into()],
    }
}

#[tokio::test]
async fn create_binds_owner_and_clock() {
    let actor = UserId::random();
    let mut repo = MockQuestionRepository::new();
    repo.expect_missing_tags().return_once(|_| Ok(Vec::new()));
    repo.expect_insert()
        .withf(move |q| q.owner == actor && q.is_active && q.created_at == fixture_timestamp())
        .times(1)
        .return_once(|_| Ok(()));

    let created = make_service(repo)
        .create(&actor, input("How do I get a bonafide certificate?"))
        .await
        .expect("created");

    assert_eq!(created.question.owner, actor);
    assert_eq!(created.question.scope, Scope::GradYear);
    assert_eq!(created.votes, 0);
    assert!(!created.has_voted);
}

#[tokio::test]
async fn create_requires_title() {
    let mut request = input("x");
    request.title = None;
    let err = make_service(MockQuestionRepository::new())
        .create(&UserId::random(), request)
        .await
        .expect_err("missing title");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().and_then(|d| d.get("field")), Some(&json!("title")));
}

#[tokio::test]
async fn create_rejects_unknown_tags() {
    let mut repo = MockQuestionRepository::new();
    repo.expect_missing_tags()
        .return_once(|_| Ok(vec![TagSlug::from_trusted("quantum")]));

    let mut request = input("Any quantum electives?");
    request.tags = vec!["quantum".into()];
    let err = make_service(repo)
        .create(&UserId::random(), request)
        .await
        .expect_err("unknown tag");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("unknown")),
        Some(&json!(["quantum"]))
    );
}

#[tokio::test]
async fn get_hidden_question_is_not_found() {
    let mut repo = MockQuestionRepository::new();
    repo.expect_find_visible().return_once(|_, _| Ok(None));
    let err = make_service(repo)
        .get(&UserId::random(), &QuestionId::random())
        .await
        .expect_err("hidden");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn mutation_by_non_owner_is_forbidden(#[case] delete: bool) {
    let owner = UserId::random();
    let stored = question(owner);
    let id = stored.id;
    let mut repo = MockQuestionRepository::new();
    repo.expect_find_visible()
        .return_once(move |_, _| Ok(Some(view(stored))));

    let service = make_service(repo);
    let intruder = UserId::random();
    let err = if delete {
        service.delete(&intruder, &id).await.expect_err("forbidden")
    } else {
        service
            .update(&intruder, &id, input("Changed"))
            .await
            .expect_err("forbidden")
    };
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_of_answered_question_is_rejected() {
    let owner = UserId::random();
    let stored = question(owner);
    let id = stored.id;
    let mut repo = MockQuestionRepository::new();
    repo.expect_find_visible()
        .return_once(move |_, _| Ok(Some(view(stored))));
    repo.expect_has_active_answers().return_once(|_| Ok(true));
    repo.expect_update().never();

    let err = make_service(repo)
        .update(&owner, &id, input("Changed"))
        .await
        .expect_err("answered");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "Answered questions cannot be updated");
}

#[tokio::test]
async fn update_by_owner_replaces_fields() {
    let owner = UserId::random();
    let stored = question(owner);
    let id = stored.id;
    let mut updated = stored.clone();
    updated.title = "Changed".into();

    let mut repo = MockQuestionRepository::new();
    let mut seq = mockall::Sequence::new();
    repo.expect_find_visible()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| Ok(Some(view(stored))));
    repo.expect_has_active_answers().return_once(|_| Ok(false));
    repo.expect_missing_tags().return_once(|_| Ok(Vec::new()));
    repo.expect_update()
        .withf(|_, draft| draft.title == "Changed")
        .times(1)
        .return_once(|_, _| Ok(()));
    repo.expect_find_visible()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| Ok(Some(view(updated))));

    let result = make_service(repo)
        .update(&owner, &id, input("Changed"))
        .await
        .expect("updated");
    assert_eq!(result.question.title, "Changed");
}

#[tokio::test]
async fn delete_by_owner_deactivates() {
    let owner = UserId::random();
    let stored = question(owner);
    let id = stored.id;
    let mut repo = MockQuestionRepository::new();
    repo.expect_find_visible()
        .return_once(move |_, _| Ok(Some(view(stored))));
    repo.expect_deactivate()
        .withf(move |target| *target == id)
        .times(1)
        .return_once(|_| Ok(()));

    make_service(repo)
        .delete(&owner, &id)
        .await
        .expect("deleted");
}
