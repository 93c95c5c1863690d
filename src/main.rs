//! One-shot smoke client for the interaction engine.
//!
//! Wires the real HTTP backend and file shadow from environment
//! configuration, runs a single operation, and prints the outcome. Useful
//! for poking a deployed backend without booting an app shell:
//!
//! ```text
//! mixwave-client toggle-like mix 0190b5b2-...-a3f1
//! mixwave-client comment post 0190b5b2-...-a3f1 "Great track!"
//! mixwave-client refresh vibe 0190b5b2-...-a3f1
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use uuid::Uuid;

use mixwave_client::config::EngineConfig;
use mixwave_client::domain::interaction::stats::{EntityKind, EntityRef};
use mixwave_client::domain::shared::pagination::PaginationRequest;
use mixwave_client::engine::InteractionEngine;
use mixwave_client::infrastructure::backend::http_backend::{HttpBackend, HttpSessionProvider};
use mixwave_client::infrastructure::shadow::file_shadow::FileShadow;
use mixwave_client::infrastructure::throttle::clock::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging with safe environment filter
    // Uses RUST_LOG if set, otherwise uses sensible defaults
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,mixwave_client=debug"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = EngineConfig::from_env()?;
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let token = config.session_token.as_deref();
    let backend = Arc::new(HttpBackend::new(&config.backend_base_url, timeout, token)?);
    let sessions = Arc::new(HttpSessionProvider::new(
        &config.backend_base_url,
        timeout,
        token,
    )?);
    let shadow = Arc::new(FileShadow::open(&config.shadow_path).await?);
    let engine = InteractionEngine::new(config, backend, sessions, shadow, Arc::new(SystemClock));

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        bail!("usage: mixwave-client <toggle-like|comment|refresh|comments> <vibe|mix|post> <entity-uuid> [text]");
    };
    let kind: EntityKind = args
        .next()
        .context("missing entity kind (vibe|mix|post)")?
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let id: Uuid = args
        .next()
        .context("missing entity id")?
        .parse()
        .context("entity id is not a UUID")?;
    let entity = EntityRef::new(kind, id);

    engine.hydrate(entity).await;

    match command.as_str() {
        "toggle-like" => {
            let outcome = engine.toggle_like(entity).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        "comment" => {
            let text = args.collect::<Vec<_>>().join(" ");
            let outcome = engine.submit_comment(entity, &text).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        "refresh" => {
            let stats = engine.refresh_stats(entity).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        "comments" => {
            let comments = engine
                .load_comments(entity, PaginationRequest::default())
                .await?;
            println!("{}", serde_json::to_string_pretty(&comments)?);
        }
        other => bail!("unknown command: {other}"),
    }

    Ok(())
}
