//! Engine configuration loading from environment variables.
//!
//! All configuration is loaded from the environment at startup via standard
//! `std::env::var`, so embedders and the smoke binary configure the engine
//! the same way in development, CI, and packaged builds.
//!
//! # Environment Variables
//!
//! ## Required Variables
//! - `MIXWAVE_BACKEND_URL`: Base URL of the hosted backend
//!
//! ## Optional Variables
//! - `MIXWAVE_SESSION_TOKEN`: Bearer token attached to every backend request
//! - `MIXWAVE_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 10)
//! - `MIXWAVE_SHADOW_PATH`: Counter shadow file (default: "./mixwave_shadow.json")
//! - `MIXWAVE_SESSION_CHECKS_PER_MINUTE`: Rolling-window cap on session re-checks (default: 10)
//! - `MIXWAVE_SESSION_CHECK_CONCURRENCY`: Concurrent session-check cap (default: 2)
//! - `MIXWAVE_VISIBILITY_DEBOUNCE_MS`: Min gap between visibility-regain refreshes (default: 2000)
//! - `MIXWAVE_NOTICE_DEDUP_WINDOW_SECS`: Window suppressing duplicate notices (default: 5)
//! - `MIXWAVE_EVENT_CAPACITY`: Broadcast buffer for engine events (default: 100)
//! - `MIXWAVE_COMMENT_ATTEMPTS`: Override total comment attempts for every feature
//! - `MIXWAVE_COMMENT_BACKOFF_BASE_MS`: Override the base backoff delay for every feature
//! - `MIXWAVE_MAX_COMMENT_CHARS`: Override the comment length bound for every feature

use crate::domain::interaction::stats::EntityKind;

/// Optimistic-mutation tuning for one content family.
///
/// The surveyed features each hard-coded slightly different retry and length
/// constants; they are explicit configuration here, one block per family,
/// instead of being re-derived inside each feature.
#[derive(Debug, Clone, Copy)]
pub struct InteractionTuning {
    /// Upper bound on comment length, in characters.
    pub max_comment_chars: usize,

    /// Total comment-creation attempts, the first call included.
    pub comment_attempts: u32,

    /// Delay before the first retry; doubles on each further retry.
    pub comment_backoff_base_ms: u64,
}

impl InteractionTuning {
    fn vibes() -> Self {
        Self {
            max_comment_chars: 500,
            comment_attempts: 3,
            comment_backoff_base_ms: 500,
        }
    }

    fn mixes() -> Self {
        Self {
            max_comment_chars: 500,
            comment_attempts: 3,
            comment_backoff_base_ms: 500,
        }
    }

    fn posts() -> Self {
        Self {
            max_comment_chars: 1000,
            comment_attempts: 3,
            comment_backoff_base_ms: 500,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the hosted backend (e.g. `https://api.mixwave.fm`)
    pub backend_base_url: String,

    /// Bearer token attached to every backend request
    pub session_token: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Path of the persisted counter shadow file
    pub shadow_path: String,

    /// Rolling-window cap on session re-checks per minute
    pub session_checks_per_minute: u32,

    /// Cap on concurrent session checks
    pub session_check_concurrency: u32,

    /// Minimum gap between visibility-regain refreshes, in milliseconds
    pub visibility_debounce_ms: u64,

    /// Window within which identical notices are suppressed, in seconds
    pub notice_dedup_window_secs: u64,

    /// Broadcast buffer size for engine events
    pub event_capacity: usize,

    pub vibes: InteractionTuning,
    pub mixes: InteractionTuning,
    pub posts: InteractionTuning,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is missing or a
    /// set variable cannot be parsed to the expected type.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self {
            backend_base_url: env_required("MIXWAVE_BACKEND_URL")?,
            session_token: std::env::var("MIXWAVE_SESSION_TOKEN").ok(),
            request_timeout_secs: env_or("MIXWAVE_REQUEST_TIMEOUT_SECS", 10)?,
            shadow_path: env_or("MIXWAVE_SHADOW_PATH", "./mixwave_shadow.json".to_string())?,
            session_checks_per_minute: env_or("MIXWAVE_SESSION_CHECKS_PER_MINUTE", 10)?,
            session_check_concurrency: env_or("MIXWAVE_SESSION_CHECK_CONCURRENCY", 2)?,
            visibility_debounce_ms: env_or("MIXWAVE_VISIBILITY_DEBOUNCE_MS", 2000)?,
            notice_dedup_window_secs: env_or("MIXWAVE_NOTICE_DEDUP_WINDOW_SECS", 5)?,
            event_capacity: env_or("MIXWAVE_EVENT_CAPACITY", 100)?,
            vibes: InteractionTuning::vibes(),
            mixes: InteractionTuning::mixes(),
            posts: InteractionTuning::posts(),
        };
        for tuning in [&mut config.vibes, &mut config.mixes, &mut config.posts] {
            tuning.comment_attempts = env_or("MIXWAVE_COMMENT_ATTEMPTS", tuning.comment_attempts)?;
            tuning.comment_backoff_base_ms =
                env_or("MIXWAVE_COMMENT_BACKOFF_BASE_MS", tuning.comment_backoff_base_ms)?;
            tuning.max_comment_chars =
                env_or("MIXWAVE_MAX_COMMENT_CHARS", tuning.max_comment_chars)?;
        }
        Ok(config)
    }

    pub fn tuning_for(&self, kind: EntityKind) -> InteractionTuning {
        match kind {
            EntityKind::Vibe => self.vibes,
            EntityKind::Mix => self.mixes,
            EntityKind::Post => self.posts,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:3000".to_string(),
            session_token: None,
            request_timeout_secs: 10,
            shadow_path: "./mixwave_shadow.json".to_string(),
            session_checks_per_minute: 10,
            session_check_concurrency: 2,
            visibility_debounce_ms: 2000,
            notice_dedup_window_secs: 5,
            event_capacity: 100,
            vibes: InteractionTuning::vibes(),
            mixes: InteractionTuning::mixes(),
            posts: InteractionTuning::posts(),
        }
    }
}

/// Load a required environment variable.
fn env_required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("Missing required environment variable: {}", key))
}

/// Load an environment variable with a default value.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
