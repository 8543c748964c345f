mod common;

use common::{GET_QUESTION, Harness, MASTERY, SUBMIT, feedback, mastery, question, server_error};
use quiz_core::model::{Difficulty, QuestionId, TopicMastery};
use services::state::{Advance, PracticePhase};
use services::{AuthError, ClientError, SubmitOutcome};

fn current_question_id(harness: &Harness) -> Option<QuestionId> {
    harness
        .client
        .snapshot()
        .practice()
        .question()
        .map(|question| question.id())
}

#[tokio::test]
async fn entering_practice_presents_a_question() {
    let harness = Harness::signed_in("ana", false).await;
    let state = harness.client.snapshot();
    assert_eq!(state.practice().phase(), PracticePhase::Presented);
    assert_eq!(harness.api.calls(GET_QUESTION), 1);
}

#[tokio::test]
async fn failed_submission_keeps_question_and_answer() {
    let harness = Harness::signed_in("ana", false).await;
    let presented = current_question_id(&harness);
    harness.api.push_feedback(Err(server_error()));

    harness.client.practice().set_answer("binary search");
    let err = harness.client.practice().submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));

    let state = harness.client.snapshot();
    let practice = state.practice();
    assert_eq!(practice.phase(), PracticePhase::Presented);
    assert_eq!(current_question_id(&harness), presented);
    assert_eq!(practice.answer(), "binary search");
    assert_eq!(practice.attempts(), 0);
    assert!(practice.error().is_some());

    let outcome = harness.client.practice().submit().await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Scored(_)));
    assert_eq!(harness.client.snapshot().practice().attempts(), 1);
}

#[tokio::test]
async fn drift_alert_counts_once() {
    let harness = Harness::signed_in("ana", false).await;
    harness
        .api
        .push_feedback(Ok(feedback(false, true, Some(question(10, "graphs", Difficulty::Medium)))));
    harness
        .api
        .push_feedback(Ok(feedback(true, false, Some(question(11, "graphs", Difficulty::Medium)))));

    let outcome = harness.client.practice().submit().await.unwrap();
    let SubmitOutcome::Scored(scored) = outcome else {
        panic!("expected a scored submission, got {outcome:?}");
    };
    assert!(!scored.correct);
    assert!(scored.drift_alert);

    let state = harness.client.snapshot();
    assert_eq!(state.practice().drift_events(), 1);
    assert!(state.practice().feedback().unwrap().drift_alert());

    harness.client.practice().next_question().await.unwrap();
    harness.client.practice().submit().await.unwrap();

    let state = harness.client.snapshot();
    assert_eq!(state.practice().attempts(), 2);
    assert_eq!(state.practice().drift_events(), 1);
}

#[tokio::test]
async fn next_question_promotes_bundled_question_without_fetching() {
    let harness = Harness::signed_in("ana", false).await;
    harness
        .api
        .push_feedback(Ok(feedback(true, false, Some(question(99, "trees", Difficulty::Hard)))));
    harness.client.practice().set_answer("O(log n)");
    harness.client.practice().submit().await.unwrap();
    let fetches = harness.api.calls(GET_QUESTION);

    let advance = harness.client.practice().next_question().await.unwrap();
    assert_eq!(advance, Advance::Promoted);
    assert_eq!(harness.api.calls(GET_QUESTION), fetches);

    let state = harness.client.snapshot();
    assert_eq!(current_question_id(&harness), Some(QuestionId::new(99)));
    assert!(state.practice().feedback().is_none());
    assert_eq!(state.practice().answer(), "");

    let again = harness.client.practice().next_question().await.unwrap();
    assert_eq!(again, Advance::Ignored);
    assert_eq!(harness.api.calls(GET_QUESTION), fetches);
}

#[tokio::test]
async fn next_question_fetches_when_feedback_has_none() {
    let harness = Harness::signed_in("ana", false).await;
    harness.api.push_feedback(Ok(feedback(true, false, None)));
    harness
        .api
        .push_question(Ok(question(42, "hashing", Difficulty::Medium)));
    harness.client.practice().submit().await.unwrap();
    let fetches = harness.api.calls(GET_QUESTION);

    let advance = harness.client.practice().next_question().await.unwrap();
    assert_eq!(advance, Advance::FetchRequired);
    assert_eq!(harness.api.calls(GET_QUESTION), fetches + 1);
    assert_eq!(current_question_id(&harness), Some(QuestionId::new(42)));
}

#[tokio::test]
async fn duplicate_submit_is_ignored_while_scoring() {
    let harness = Harness::signed_in("ana", false).await;
    let hold = harness.api.hold(SUBMIT);
    let practice = harness.client.practice().clone();
    let first = tokio::spawn(async move { practice.submit().await });

    hold.started().await;
    let second = harness.client.practice().submit().await.unwrap();
    assert_eq!(second, SubmitOutcome::Ignored);

    hold.release();
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, SubmitOutcome::Scored(_)));
    assert_eq!(harness.api.calls(SUBMIT), 1);
    assert_eq!(harness.client.snapshot().practice().attempts(), 1);
}

#[tokio::test]
async fn feedback_arriving_after_logout_is_not_counted() {
    let harness = Harness::signed_in("ana", false).await;
    let hold = harness.api.hold(SUBMIT);
    let practice = harness.client.practice().clone();
    let pending = tokio::spawn(async move { practice.submit().await });

    hold.started().await;
    harness.client.session().logout().await.unwrap();
    hold.release();

    assert_eq!(pending.await.unwrap().unwrap(), SubmitOutcome::Stale);
    let state = harness.client.snapshot();
    assert_eq!(state.practice().attempts(), 0);
    assert!(state.practice().feedback().is_none());
}

#[tokio::test]
async fn submission_carries_question_answer_and_elapsed_time() {
    let harness = Harness::signed_in("ana", false).await;
    let presented = current_question_id(&harness).unwrap();
    harness.client.practice().set_answer("  a stack  ");
    harness.client.practice().submit().await.unwrap();

    let submissions = harness.api.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].question_id, presented);
    assert_eq!(submissions[0].user_answer, "  a stack  ");
    assert_eq!(submissions[0].time_taken_seconds, 0);
}

#[tokio::test]
async fn successful_submission_replaces_mastery_wholesale() {
    let harness = Harness::new();
    harness
        .api
        .push_mastery(Ok(mastery(&[("arrays", 40), ("graphs", 10)])));
    harness.client.session().login("ana", "pw").await.unwrap();
    harness.client.settle().await;
    assert_eq!(harness.client.snapshot().stats().mastery().len(), 2);

    harness.api.push_mastery(Ok(mastery(&[("arrays", 55)])));
    harness.client.practice().submit().await.unwrap();
    harness.client.settle().await;

    let state = harness.client.snapshot();
    let snapshot = state.stats().mastery();
    assert_eq!(harness.api.calls(MASTERY), 2);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("arrays").map(TopicMastery::percent), Some(55));
    assert!(snapshot.get("graphs").is_none());
    assert_eq!(state.practice().skill().map(|skill| skill.percent()), Some(60));
}

#[tokio::test]
async fn failed_mastery_refresh_keeps_last_snapshot() {
    let harness = Harness::new();
    harness.api.push_mastery(Ok(mastery(&[("arrays", 40)])));
    harness.client.session().login("ana", "pw").await.unwrap();
    harness.client.settle().await;

    harness.api.push_mastery(Err(server_error()));
    assert!(harness.client.stats().refresh_mastery().await.is_err());

    let state = harness.client.snapshot();
    assert_eq!(state.stats().mastery().len(), 1);
    assert!(state.stats().mastery_error().is_some());
    assert!(state.session().is_authenticated());
}

#[tokio::test]
async fn submit_requires_a_session() {
    let harness = Harness::new();
    let err = harness.client.practice().submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(AuthError::NotAuthenticated)));
}
