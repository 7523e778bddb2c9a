//! Palate-Core: the review pipeline
//!
//! Accepts review submissions, scores them with the sentiment service,
//! stores them, and composes the restaurant leaderboard.
//!
//! ## Layer 2 - Domain
//!
//! Focus: validation before any I/O, a four-kind error taxonomy, and
//! request-scoped store sessions.
//!
//! ## Key Components
//!
//! - `ReviewPipeline`: `submit_review`, `list_reviews`, `leaderboard`
//! - `PipelineError`: invalid input, not found, upstream failure,
//!   persistence failure
//! - `validation`: id parsing, review text checks, limit resolution
//! - `obs` / `telemetry`: structured events and subscriber setup

pub mod config;
pub mod error;
pub mod leaderboard;
pub mod model;
pub mod obs;
mod pipeline;
pub mod telemetry;
pub mod validation;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use leaderboard::join_scores;
pub use model::{LeaderboardEntry, Review, SubmitReview};
pub use obs::{
    emit_leaderboard_served, emit_request_rejected, emit_review_persist_failed,
    emit_review_submitted, emit_reviews_listed, RequestSpan,
};
pub use pipeline::ReviewPipeline;
pub use telemetry::init_tracing;
