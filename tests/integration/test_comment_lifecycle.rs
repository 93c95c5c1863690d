use std::sync::atomic::Ordering;
use std::time::Duration;

use mixwave_client::application::submit_comment::dto::CommentOutcome;
use mixwave_client::domain::interaction::comment::CommentSync;
use mixwave_client::domain::interaction::errors::InteractionError;
use mixwave_client::domain::interaction::stats::EntityKind;
use mixwave_client::domain::shared::pagination::PaginationRequest;
use mixwave_client::engine::events::EngineEvent;

use crate::helpers::{StatsShape, drain_events, entity, signed_in};

fn transient() -> InteractionError {
    InteractionError::Transient("gateway 502".into())
}

#[tokio::test]
async fn comment_goes_optimistic_then_confirmed() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Post);
    let before = h.engine.stats(e).await;

    let outcome = h.engine.submit_comment(e, "Great track!").await.unwrap();
    let CommentOutcome::Confirmed(confirmed) = outcome else {
        panic!("expected a confirmed comment");
    };
    assert_eq!(confirmed.text, "Great track!");
    assert_eq!(confirmed.author_id, h.user_id);
    assert!(!confirmed.is_optimistic());

    let comments = h.engine.comments(e).await;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "Great track!");
    assert_eq!(comments[0].sync, CommentSync::Confirmed);
    assert_eq!(
        h.engine.stats(e).await.comments_count,
        before.comments_count + 1
    );
}

#[tokio::test(start_paused = true)]
async fn transient_failures_stop_at_the_attempt_ceiling() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Vibe);
    let mut rx = h.engine.subscribe();
    h.backend
        .script_comment_failures([transient(), transient(), transient()])
        .await;

    let started = tokio::time::Instant::now();
    let outcome = h.engine.submit_comment(e, "still here?").await.unwrap();

    assert!(matches!(outcome, CommentOutcome::PendingSync(_)));
    assert_eq!(h.backend.comment_calls.load(Ordering::SeqCst), 3);
    // Two backoff waits, the second twice the first.
    assert_eq!(started.elapsed(), Duration::from_millis(500 + 1000));

    // The record stays visible and keeps its optimistic counter increment.
    let comments = h.engine.comments(e).await;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].sync, CommentSync::PendingSync);
    assert_eq!(h.engine.stats(e).await.comments_count, 1);

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|ev| matches!(ev, EngineEvent::CommentPendingSync { .. }))
    );
    assert!(
        events
            .iter()
            .any(|ev| matches!(ev, EngineEvent::Notice(_))),
        "exhausted retries surface a user-facing notice"
    );
}

#[tokio::test(start_paused = true)]
async fn parked_comments_can_be_retried_to_confirmation() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Mix);
    h.backend
        .script_comment_failures([transient(), transient(), transient()])
        .await;

    let outcome = h.engine.submit_comment(e, "take two").await.unwrap();
    let CommentOutcome::PendingSync(parked) = outcome else {
        panic!("expected a pending-sync comment");
    };

    // The backlog is drained now, so the manual retry goes through.
    let retried = h.engine.retry_comment(e, parked.id).await.unwrap();
    let CommentOutcome::Confirmed(confirmed) = retried else {
        panic!("expected confirmation on retry");
    };
    assert_eq!(confirmed.text, "take two");
    assert_eq!(h.backend.comment_calls.load(Ordering::SeqCst), 4);

    let comments = h.engine.comments(e).await;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].sync, CommentSync::Confirmed);
}

#[tokio::test(start_paused = true)]
async fn discarding_a_parked_comment_takes_the_counter_back() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Vibe);
    h.backend
        .script_comment_failures([transient(), transient(), transient()])
        .await;

    let outcome = h.engine.submit_comment(e, "never mind").await.unwrap();
    let CommentOutcome::PendingSync(parked) = outcome else {
        panic!("expected a pending-sync comment");
    };
    assert_eq!(h.engine.stats(e).await.comments_count, 1);

    assert!(h.engine.discard_comment(e, parked.id).await);
    assert!(h.engine.comments(e).await.is_empty());
    assert_eq!(h.engine.stats(e).await.comments_count, 0);
}

#[tokio::test]
async fn nonretriable_rejection_rolls_the_comment_back() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Post);
    h.backend
        .script_comment_failures([InteractionError::Validation("text too long".into())])
        .await;

    let err = h.engine.submit_comment(e, "some text").await.unwrap_err();
    assert_eq!(err, InteractionError::Validation("text too long".into()));

    // No retry for validation failures, and no trace left behind.
    assert_eq!(h.backend.comment_calls.load(Ordering::SeqCst), 1);
    assert!(h.engine.comments(e).await.is_empty());
    assert_eq!(h.engine.stats(e).await.comments_count, 0);
}

#[tokio::test]
async fn empty_text_is_rejected_before_any_mutation() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Vibe);

    let err = h.engine.submit_comment(e, "   ").await.unwrap_err();
    assert!(matches!(err, InteractionError::Validation(_)));
    assert_eq!(h.backend.comment_calls.load(Ordering::SeqCst), 0);
    assert!(h.engine.comments(e).await.is_empty());
    assert_eq!(h.engine.stats(e).await.comments_count, 0);
}

#[tokio::test(start_paused = true)]
async fn loaded_pages_merge_under_pending_records() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Mix);
    h.backend.seed_comment(e.id, h.user_id, "from the feed").await;
    h.backend
        .script_comment_failures([transient(), transient(), transient()])
        .await;

    let outcome = h.engine.submit_comment(e, "pending local").await.unwrap();
    assert!(matches!(outcome, CommentOutcome::PendingSync(_)));

    let merged = h
        .engine
        .load_comments(e, PaginationRequest::default())
        .await
        .unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].text, "pending local");
    assert_eq!(merged[0].sync, CommentSync::PendingSync);
    assert_eq!(merged[1].text, "from the feed");
    assert_eq!(merged[1].sync, CommentSync::Confirmed);
}
