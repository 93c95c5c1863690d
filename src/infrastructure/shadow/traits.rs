use async_trait::async_trait;

/// Best-effort durable store for last-confirmed counters.
///
/// Reads pre-seed UI state at mount so counters don't flash zero before the
/// authoritative fetch lands; writes mirror server-confirmed values only,
/// never optimistic ones. Failures here are degraded operation, not errors
/// the user should see; callers log and move on.
#[async_trait]
pub trait CounterShadow: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<u64>>;
    async fn store(&self, key: &str, count: u64) -> anyhow::Result<()>;
}
