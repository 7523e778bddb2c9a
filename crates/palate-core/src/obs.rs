//! Structured observability hooks for review pipeline events.
//!
//! This module provides:
//! - Request-scoped tracing spans via `RequestSpan`
//! - Emission functions for submissions, rejections, persistence gaps and
//!   served leaderboards
//!
//! Events are emitted at `info!` level (configurable via `PALATE_LOG`).
//! For JSON output, pass `--json-logs` to the daemon.

use std::future::Future;

use tracing::instrument::Instrumented;
use tracing::{info, warn, Instrument};

use crate::error::PipelineError;

/// A span tagged with the operation name and a fresh request id.
///
/// Futures are attached with [`RequestSpan::in_span`], so the span stays
/// valid across await points and the wrapped future stays `Send`.
///
/// # Example
///
/// ```ignore
/// let span = RequestSpan::new("submit_review");
/// span.in_span(async { /* events carry request_id */ }).await;
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpan {
    span: tracing::Span,
    request_id: String,
}

impl RequestSpan {
    /// Create a span for one pipeline operation.
    pub fn new(operation: &str) -> Self {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "palate.request",
            operation = %operation,
            request_id = %request_id,
        );
        Self { span, request_id }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Run `fut` inside this span.
    pub fn in_span<F: Future>(&self, fut: F) -> Instrumented<F> {
        fut.instrument(self.span.clone())
    }
}

/// Emit event: a review was scored and stored.
pub fn emit_review_submitted(review_id: &str, restaurant_id: &str, label: &str, score: f64) {
    info!(
        event = "review.submitted",
        review_id = %review_id,
        restaurant_id = %restaurant_id,
        label = %label,
        score = score,
    );
}

/// Emit event: an operation failed.
///
/// Client errors log at info, collaborator failures at warn.
pub fn emit_request_rejected(operation: &str, error: &PipelineError) {
    if error.is_client_error() {
        info!(event = "review.rejected", operation = %operation, kind = error.kind(), error = %error);
    } else {
        warn!(event = "review.rejected", operation = %operation, kind = error.kind(), error = %error);
    }
}

/// Emit event: a scored review could not be stored (warning level).
///
/// The sentiment service has already counted the review at this point.
pub fn emit_review_persist_failed(restaurant_id: &str, score: f64, error: &dyn std::fmt::Display) {
    warn!(
        event = "review.persist_failed",
        restaurant_id = %restaurant_id,
        score = score,
        error = %error,
    );
}

/// Emit event: a leaderboard was composed.
pub fn emit_leaderboard_served(limit: usize, entries: usize, scored: usize) {
    info!(
        event = "leaderboard.served",
        limit = limit,
        entries = entries,
        scored = scored,
    );
}

/// Emit event: reviews were listed.
pub fn emit_reviews_listed(restaurant_id: Option<&str>, count: usize) {
    info!(
        event = "reviews.listed",
        restaurant_id = restaurant_id.unwrap_or("*"),
        count = count,
    );
}
