use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::traits::CounterShadow;

/// JSON-file-backed counter shadow.
///
/// The full map is kept in memory and rewritten through a temp file plus
/// rename on every store, so a crash mid-write never leaves a torn file
/// behind. Holding the write lock across the rewrite makes concurrent stores
/// last-write-wins in the order their server confirmations arrived.
pub struct FileShadow {
    path: PathBuf,
    entries: RwLock<HashMap<String, u64>>,
}

impl FileShadow {
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    // Shadow data is advisory; a corrupt file is dropped, not fatal.
                    warn!(path = %path.display(), error = %e, "shadow file unreadable, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "counter shadow opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }
}

#[async_trait]
impl CounterShadow for FileShadow {
    async fn load(&self, key: &str) -> anyhow::Result<Option<u64>> {
        Ok(self.entries.read().await.get(key).copied())
    }

    async fn store(&self, key: &str, count: u64) -> anyhow::Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), count);
        let bytes = serde_json::to_vec_pretty(&*entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
