use mixwave_client::domain::{
    interaction::comment::validate_text,
    interaction::errors::InteractionError,
    interaction::stats::{EntityKind, EntityRef, InteractionStats, StatsPayload},
    shared::pagination::PaginationRequest,
};
use uuid::Uuid;

#[test]
fn both_stats_encodings_normalize_to_the_same_value() {
    let legacy: StatsPayload = serde_json::from_str(r#"["5", "2"]"#).unwrap();
    let object: StatsPayload =
        serde_json::from_str(r#"{"total_likes": 5, "total_comments": 2}"#).unwrap();
    let expected = InteractionStats {
        likes_count: 5,
        comments_count: 2,
    };
    assert_eq!(legacy.normalize().unwrap(), expected);
    assert_eq!(object.normalize().unwrap(), expected);
}

#[test]
fn comment_text_is_trimmed_and_bounded() {
    assert_eq!(validate_text("  nice one  ", 500).unwrap(), "nice one");
    assert!(validate_text("", 500).is_err());
    assert!(validate_text("   ", 500).is_err());
    assert!(validate_text(&"a".repeat(501), 500).is_err());
    assert!(validate_text(&"a".repeat(500), 500).is_ok());
}

#[test]
fn retry_policy_follows_the_failure_class() {
    assert!(InteractionError::Transient("gateway 502".into()).is_retriable());
    for err in [
        InteractionError::Unauthenticated,
        InteractionError::Validation("bad".into()),
        InteractionError::Permission("no".into()),
        InteractionError::RateLimited,
        InteractionError::Unknown("?".into()),
    ] {
        assert!(!err.is_retriable(), "{err} must not be retried");
    }
}

#[test]
fn shadow_keys_carry_the_feature_prefix() {
    let id = Uuid::now_v7();
    assert_eq!(
        EntityRef::new(EntityKind::Mix, id).shadow_key(),
        format!("mix_like_count_{id}")
    );
    assert_eq!(
        EntityRef::new(EntityKind::Post, id).shadow_key(),
        format!("post_like_count_{id}")
    );
}

#[test]
fn pagination_defaults_are_safe_and_stable() {
    let p = PaginationRequest::default();
    assert_eq!(p.limit, 50);
    assert_eq!(p.offset, 0);
}
