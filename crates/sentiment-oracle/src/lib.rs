//! Sentiment-Oracle: client for the external sentiment service
//!
//! The sentiment service scores review text and keeps its own running
//! aggregate score per restaurant. This crate defines the boundary the review
//! pipeline consumes, an HTTP implementation, and a scripted fake.
//!
//! ## Layer 1 - External services
//!
//! Focus: a faithful wire contract and bounded, fail-fast calls.
//!
//! ## Wire contract
//!
//! - `POST {base}/analyze-sentiment` with `{restaurant_id, text, user_id}`
//!   returns `{sentiment, score, confidence?}`
//! - `GET {base}/leaderboard?limit=N` returns `[{restaurant_id, score}]`

mod client;
mod error;
pub mod fakes;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{HttpSentimentOracle, OracleConfig};
pub use error::OracleError;

/// Result type for sentiment-oracle operations
pub type Result<T> = std::result::Result<T, OracleError>;

/// Text submitted for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRequest {
    pub restaurant_id: String,
    pub text: String,
    pub user_id: String,
}

/// Scoring result. Label vocabulary and score semantics belong to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    #[serde(rename = "sentiment")]
    pub label: String,
    pub score: f64,
    /// Model confidence, when the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// One row of the service's aggregate leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleScore {
    pub restaurant_id: String,
    pub score: f64,
}

/// The sentiment service as seen by the pipeline.
///
/// Implementations make one request per call and never retry.
#[async_trait]
pub trait SentimentOracle: Send + Sync {
    /// Score a review. The service may fold the score into its aggregate.
    async fn analyze(&self, request: &SentimentRequest) -> Result<SentimentVerdict>;

    /// Fetch up to `limit` aggregate scores, in the service's ranking order.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<OracleScore>>;
}
