//! Client-side interaction engine for the Mixwave social music platform.
//!
//! Mixwave views (feeds, track pages, mix detail pages) do not talk to the
//! hosted backend directly. They go through [`engine::InteractionEngine`],
//! which owns the transient local state for every mounted entity: optimistic
//! like/comment counters, optimistic comment records, and a persisted counter
//! shadow that hides the zero-counter flash on mount. The backend remains the
//! system of record; everything held here is advisory and is overwritten by
//! server truth on every reconciliation.

pub mod application;
pub mod config;
pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use config::{EngineConfig, InteractionTuning};
pub use domain::interaction::errors::InteractionError;
pub use engine::InteractionEngine;
