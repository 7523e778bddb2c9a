//! Pipeline inputs and outputs.
//!
//! Field names are camelCase on the wire and timestamps are RFC 3339.

use chrono::{DateTime, Utc};
use palate_state::{RestaurantRecord, ReviewRecord};
use serde::{Deserialize, Serialize};

/// A review submission as received from a client.
///
/// Ids arrive as text and are parsed by the pipeline, not by serde, so a
/// malformed id is reported as invalid input rather than a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReview {
    pub restaurant_id: String,
    pub text: String,
    /// Submitting user, opaque to the pipeline. `userId` is accepted on input.
    #[serde(alias = "userId")]
    pub author_id: String,
}

impl SubmitReview {
    pub fn new(
        restaurant_id: impl Into<String>,
        text: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        SubmitReview {
            restaurant_id: restaurant_id.into(),
            text: text.into(),
            author_id: author_id.into(),
        }
    }
}

/// A stored, scored review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub restaurant_id: String,
    pub author_id: String,
    pub text: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRecord> for Review {
    fn from(record: ReviewRecord) -> Self {
        Review {
            id: record.id.to_string(),
            restaurant_id: record.restaurant_id.to_string(),
            author_id: record.author_id,
            text: record.text,
            sentiment_label: record.sentiment_label,
            sentiment_score: record.sentiment_score,
            created_at: record.created_at,
        }
    }
}

/// A restaurant with its aggregate sentiment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Aggregate from the sentiment service, `0.0` when it has none
    pub score: f64,
}

impl LeaderboardEntry {
    pub fn from_record(record: RestaurantRecord, score: f64) -> Self {
        LeaderboardEntry {
            id: record.id.to_string(),
            name: record.name,
            description: record.description,
            created_at: record.created_at,
            score,
        }
    }
}
