//! Tests for the in-memory store.

use std::sync::Arc;

use super::*;
use crate::domain::{AccountFlags, FlagReason};
use crate::test_support::{account, fixture_timestamp, question};
use chrono::Duration;
use futures_util::future::join_all;
use rstest::{fixture, rstest};
use uuid::Uuid;

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

fn new_account(n: u8) -> NewAccount {
    let Account {
        id,
        profile,
        flags,
        created_at,
    } = account(n, AccountFlags::regular());
    NewAccount {
        id,
        profile,
        password_hash: "hash".into(),
        flags,
        created_at,
    }
}

fn flag_by(user: UserId, target: ContentRef) -> Flag {
    Flag {
        id: Uuid::new_v4(),
        user,
        target,
        reason: FlagReason::Nsfw,
        created_at: fixture_timestamp(),
    }
}

async fn seed_question(store: &InMemoryStore, owner: UserId) -> Question {
    let question = question(owner);
    QuestionRepository::insert(store, &question)
        .await
        .expect("insert question");
    question
}

#[rstest]
#[tokio::test]
async fn departments_are_seeded(store: InMemoryStore) {
    let departments = store.list().await.expect("list");
    assert!(departments.iter().any(|d| d.code == "CSE"));
    assert!(store.exists(DepartmentId::new(5)).await.expect("exists"));
    assert!(!store.exists(DepartmentId::new(99)).await.expect("exists"));
}

#[rstest]
#[tokio::test]
async fn duplicate_unique_field_is_named(store: InMemoryStore) {
    AccountRepository::insert(&store, &new_account(1))
        .await
        .expect("first insert");
    let mut clash = new_account(2);
    clash.profile.phone = new_account(1).profile.phone;

    let err = AccountRepository::insert(&store, &clash)
        .await
        .expect_err("duplicate phone");
    assert_eq!(err, AccountRepositoryError::duplicate("phone"));
}

#[rstest]
#[tokio::test]
async fn set_active_toggles_login_flag(store: InMemoryStore) {
    let account = new_account(3);
    AccountRepository::insert(&store, &account)
        .await
        .expect("insert");

    assert!(store
        .set_active(&account.profile.roll_number, true)
        .await
        .expect("toggle"));
    let stored = store
        .find_credentials(account.profile.roll_number.as_ref())
        .await
        .expect("lookup")
        .expect("present");
    assert!(stored.account.flags.is_active);
}

#[rstest]
#[tokio::test]
async fn delete_refuses_content_owners(store: InMemoryStore) {
    let account = new_account(4);
    AccountRepository::insert(&store, &account)
        .await
        .expect("insert");
    seed_question(&store, account.id).await;

    let err = AccountRepository::delete(&store, &account.id)
        .await
        .expect_err("owns content");
    assert_eq!(err, AccountRepositoryError::in_use());
}

#[rstest]
#[tokio::test]
async fn flagged_or_inactive_questions_are_hidden(store: InMemoryStore) {
    let owner = UserId::random();
    let kept = seed_question(&store, owner).await;
    let flagged = seed_question(&store, owner).await;
    let deleted = seed_question(&store, owner).await;

    FlagRepository::insert(
        &store,
        &flag_by(UserId::random(), ContentRef::Question(flagged.id)),
    )
    .await
    .expect("flag");
    QuestionRepository::deactivate(&store, &deleted.id)
        .await
        .expect("deactivate");

    let visible = QuestionRepository::list_visible(&store, &owner)
        .await
        .expect("list");
    let ids: Vec<QuestionId> = visible.iter().map(|v| v.question.id).collect();
    assert_eq!(ids, vec![kept.id]);
    assert!(
        QuestionRepository::find_visible(&store, &flagged.id, &owner)
            .await
            .expect("find")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn list_is_newest_first(store: InMemoryStore) {
    let owner = UserId::random();
    let mut older = question(owner);
    older.created_at = fixture_timestamp() - Duration::hours(1);
    let newer = question(owner);
    QuestionRepository::insert(&store, &newer).await.expect("insert");
    QuestionRepository::insert(&store, &older).await.expect("insert");

    let ids: Vec<QuestionId> = QuestionRepository::list_visible(&store, &owner)
        .await
        .expect("list")
        .into_iter()
        .map(|v| v.question.id)
        .collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[rstest]
#[tokio::test]
async fn vote_membership_is_enforced(store: InMemoryStore) {
    let question = seed_question(&store, UserId::random()).await;
    let target = ContentRef::Question(question.id);
    let voter = UserId::random();

    assert_eq!(store.cast_vote(target, &voter, true).await, Ok(1));
    assert_eq!(
        store.cast_vote(target, &voter, true).await,
        Err(VoteRepositoryError::already_voted())
    );
    assert_eq!(store.cast_vote(target, &voter, false).await, Ok(0));
    assert_eq!(
        store.cast_vote(target, &voter, false).await,
        Err(VoteRepositoryError::not_voted())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_votes_count_once(store: InMemoryStore) {
    const ATTEMPTS: usize = 16;
    let store = Arc::new(store);
    let question = seed_question(&store, UserId::random()).await;
    let target = ContentRef::Question(question.id);
    let voter = UserId::random();

    let attempts = (0..ATTEMPTS).map(|_| {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.cast_vote(target, &voter, true).await })
    });
    let outcomes: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("vote task completes"))
        .collect();

    let accepted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let repeats = outcomes
        .iter()
        .filter(|outcome| **outcome == Err(VoteRepositoryError::already_voted()))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(repeats, ATTEMPTS - 1);
    assert!(outcomes.contains(&Ok(1)));

    let view = QuestionRepository::find_visible(&*store, &question.id, &voter)
        .await
        .expect("find")
        .expect("visible");
    assert_eq!((view.votes, view.has_voted), (1, true));
}

#[rstest]
#[tokio::test]
async fn vote_view_reports_viewer_membership(store: InMemoryStore) {
    let question = seed_question(&store, UserId::random()).await;
    let voter = UserId::random();
    store
        .cast_vote(ContentRef::Question(question.id), &voter, true)
        .await
        .expect("vote");

    let seen_by_voter = QuestionRepository::find_visible(&store, &question.id, &voter)
        .await
        .expect("find")
        .expect("visible");
    let seen_by_other = QuestionRepository::find_visible(&store, &question.id, &UserId::random())
        .await
        .expect("find")
        .expect("visible");
    assert_eq!((seen_by_voter.votes, seen_by_voter.has_voted), (1, true));
    assert_eq!((seen_by_other.votes, seen_by_other.has_voted), (1, false));
}

#[rstest]
#[tokio::test]
async fn inactive_targets_reject_votes_and_flags(store: InMemoryStore) {
    let question = seed_question(&store, UserId::random()).await;
    QuestionRepository::deactivate(&store, &question.id)
        .await
        .expect("deactivate");
    let target = ContentRef::Question(question.id);

    assert_eq!(
        store.cast_vote(target, &UserId::random(), true).await,
        Err(VoteRepositoryError::target_not_found())
    );
    assert_eq!(
        FlagRepository::insert(&store, &flag_by(UserId::random(), target)).await,
        Err(FlagRepositoryError::target_not_found())
    );
}

#[rstest]
#[tokio::test]
async fn second_flag_by_same_user_is_duplicate(store: InMemoryStore) {
    let question = seed_question(&store, UserId::random()).await;
    let target = ContentRef::Question(question.id);
    let user = UserId::random();

    FlagRepository::insert(&store, &flag_by(user, target))
        .await
        .expect("first flag");
    assert_eq!(
        FlagRepository::insert(&store, &flag_by(user, target)).await,
        Err(FlagRepositoryError::duplicate())
    );
    FlagRepository::insert(&store, &flag_by(UserId::random(), target))
        .await
        .expect("other users may still flag");
}

#[rstest]
#[tokio::test]
async fn answered_question_detection_ignores_inactive_answers(store: InMemoryStore) {
    let question = seed_question(&store, UserId::random()).await;
    let answer = Answer {
        id: AnswerId::random(),
        question_id: question.id,
        owner: UserId::random(),
        body: "Near the canteen".into(),
        is_active: true,
        created_at: fixture_timestamp(),
    };
    AnswerRepository::insert(&store, &answer).await.expect("answer");
    assert!(store.has_active_answers(&question.id).await.expect("check"));

    AnswerRepository::deactivate(&store, &answer.id)
        .await
        .expect("deactivate");
    assert!(!store.has_active_answers(&question.id).await.expect("check"));
}
