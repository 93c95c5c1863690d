use std::sync::atomic::Ordering;

use mixwave_client::domain::interaction::errors::InteractionError;
use mixwave_client::domain::interaction::like::ToggleOutcome;
use mixwave_client::domain::interaction::stats::EntityKind;
use mixwave_client::engine::events::EngineEvent;

use crate::helpers::{StatsShape, drain_events, entity, harness, signed_in};

#[tokio::test]
async fn toggle_roundtrip_returns_to_the_original_state() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Vibe);
    h.backend.seed_likes(e.id, 5).await;
    h.engine.refresh_stats(e).await.unwrap();
    let before = h.engine.like_snapshot(e).await;
    assert_eq!(before.likes_count, 5);
    assert!(!before.has_liked);

    let liked = h.engine.toggle_like(e).await.unwrap().snapshot();
    assert!(liked.has_liked);
    assert_eq!(liked.likes_count, 6);

    let unliked = h.engine.toggle_like(e).await.unwrap().snapshot();
    assert_eq!(unliked, before);
    assert_eq!(h.shadow.get(&e.shadow_key()).await, Some(5));
}

#[tokio::test]
async fn rapid_double_toggle_fires_exactly_one_request() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Mix);
    h.backend.seed_likes(e.id, 3).await;
    h.engine.refresh_stats(e).await.unwrap();
    let fetches_before = h.backend.entity_calls.load(Ordering::SeqCst);

    let release = h.backend.hold_next_toggle().await;
    let engine = h.engine.clone();
    let first = tokio::spawn(async move { engine.toggle_like(e).await });

    // Wait until the first toggle has reached the backend, which means its
    // (entity, user) slot is claimed.
    while h.backend.toggle_calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let second = h.engine.toggle_like(e).await.unwrap();
    assert!(matches!(second, ToggleOutcome::Coalesced(_)));

    release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, ToggleOutcome::Applied(_)));

    // One logical click's worth of server change, not two.
    assert_eq!(h.backend.toggle_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.engine.like_snapshot(e).await.likes_count, 4);
    // The coalesced call triggered no extra refresh either.
    assert_eq!(
        h.backend.entity_calls.load(Ordering::SeqCst),
        fetches_before + 1
    );
}

#[tokio::test]
async fn rejected_toggle_restores_the_previous_state() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Post);
    h.backend.seed_likes(e.id, 3).await;
    h.engine.refresh_stats(e).await.unwrap();
    let before = h.engine.like_snapshot(e).await;

    h.backend
        .script_toggle_failure(InteractionError::Unknown("boom".into()))
        .await;
    let err = h.engine.toggle_like(e).await.unwrap_err();
    assert!(matches!(err, InteractionError::Unknown(_)));

    assert_eq!(h.engine.like_snapshot(e).await, before);
    // The shadow still carries the last server-confirmed value.
    assert_eq!(h.shadow.get(&e.shadow_key()).await, Some(3));
}

#[tokio::test]
async fn signed_out_mutations_never_reach_the_backend() {
    let h = harness(StatsShape::Object, None);
    let e = entity(EntityKind::Vibe);
    let mut rx = h.engine.subscribe();

    let toggle_err = h.engine.toggle_like(e).await.unwrap_err();
    let comment_err = h.engine.submit_comment(e, "hello").await.unwrap_err();
    assert_eq!(toggle_err, InteractionError::Unauthenticated);
    assert_eq!(comment_err, InteractionError::Unauthenticated);

    assert_eq!(h.backend.toggle_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.backend.comment_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.engine.stats(e).await, Default::default());
    assert!(h.engine.comments(e).await.is_empty());

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|ev| matches!(ev, EngineEvent::AuthRequired)),
        "embedders are told to route to the login prompt"
    );
}

#[tokio::test]
async fn both_wire_shapes_produce_identical_stats() {
    let object = signed_in(StatsShape::Object);
    let legacy = signed_in(StatsShape::LegacyStrings);
    let e = entity(EntityKind::Mix);
    for h in [&object, &legacy] {
        h.backend.seed_likes(e.id, 5).await;
        h.backend.seed_comment(e.id, h.user_id, "first").await;
        h.backend.seed_comment(e.id, h.user_id, "second").await;
    }

    let from_object = object.engine.refresh_stats(e).await.unwrap();
    let from_legacy = legacy.engine.refresh_stats(e).await.unwrap();
    assert_eq!(from_object, from_legacy);
    assert_eq!(from_object.likes_count, 5);
    assert_eq!(from_object.comments_count, 2);
}

#[tokio::test]
async fn hydration_preseeds_counters_without_touching_the_backend() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Post);
    h.shadow.put(&e.shadow_key(), 7).await;
    h.backend.seed_likes(e.id, 2).await;

    h.engine.hydrate(e).await;
    assert_eq!(h.engine.like_snapshot(e).await.likes_count, 7);
    assert_eq!(h.backend.entity_calls.load(Ordering::SeqCst), 0);

    // The authoritative fetch then overwrites the advisory seed.
    let stats = h.engine.refresh_stats(e).await.unwrap();
    assert_eq!(stats.likes_count, 2);
    assert_eq!(h.shadow.get(&e.shadow_key()).await, Some(2));
}

#[tokio::test]
async fn visibility_refreshes_are_debounced() {
    let h = signed_in(StatsShape::Object);
    let e = entity(EntityKind::Vibe);
    h.backend.seed_likes(e.id, 1).await;

    let first = h.engine.on_visibility_regained(e).await.unwrap();
    assert!(first.is_some());
    let burst = h.engine.on_visibility_regained(e).await.unwrap();
    assert!(burst.is_none());
    assert_eq!(h.backend.entity_calls.load(Ordering::SeqCst), 1);

    h.clock.advance(std::time::Duration::from_millis(2001));
    let later = h.engine.on_visibility_regained(e).await.unwrap();
    assert!(later.is_some());
    assert_eq!(h.backend.entity_calls.load(Ordering::SeqCst), 2);
}
