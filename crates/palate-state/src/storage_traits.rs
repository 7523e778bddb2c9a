//! Storage trait definitions for Palate
//!
//! These traits define the persistence boundary of the review pipeline:
//! - `RestaurantDirectory`: read-only lookup of restaurant records
//! - `ReviewStore`: append-only persistence of scored reviews
//! - `SessionSource`: request-scoped acquisition of a session that offers both
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Longest accepted identifier text.
pub const MAX_RECORD_ID_LEN: usize = 64;

// ---------------------------------------------------------------------------
// RecordId: opaque identity
// ---------------------------------------------------------------------------

/// Opaque record identifier assigned by the store.
///
/// The inner field is private so every value has passed [`RecordId::parse`]
/// or was minted by [`RecordId::generate`]. The canonical text form is what
/// `Display` and `as_str` return, and it parses back to an equal id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        RecordId(uuid::Uuid::new_v4().to_string())
    }

    /// Parse identifier text received from outside the store.
    ///
    /// Accepts 1..=64 characters drawn from ASCII alphanumerics, `-` and `_`.
    pub fn parse(text: &str) -> StorageResult<Self> {
        let well_formed = !text.is_empty()
            && text.len() <= MAX_RECORD_ID_LEN
            && text
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !well_formed {
            return Err(StorageError::InvalidRecordId {
                value: text.to_string(),
            });
        }
        Ok(RecordId(text.to_string()))
    }

    /// Canonical text form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RecordId {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        RecordId::parse(&s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A restaurant as held by the directory. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A scored review that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub restaurant_id: RecordId,
    pub author_id: String,
    pub text: String,
    /// Label as returned by the sentiment oracle
    pub sentiment_label: String,
    /// Score as returned by the sentiment oracle
    pub sentiment_score: f64,
    pub created_at: DateTime<Utc>,
}

/// A persisted review. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: RecordId,
    pub restaurant_id: RecordId,
    pub author_id: String,
    pub text: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Attach a store-assigned id to a new review.
    pub fn assign(id: RecordId, review: NewReview) -> Self {
        ReviewRecord {
            id,
            restaurant_id: review.restaurant_id,
            author_id: review.author_id,
            text: review.text,
            sentiment_label: review.sentiment_label,
            sentiment_score: review.sentiment_score,
            created_at: review.created_at,
        }
    }
}

/// Review lookup. Results are always newest first by `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewQuery {
    /// Restrict to one restaurant
    pub restaurant_id: Option<RecordId>,
    /// Maximum number of reviews returned
    pub limit: usize,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Authoritative store of restaurant identity and metadata.
///
/// Guarantees:
/// - `find_restaurant` returns `None` (not an error) for an unknown id.
/// - `list_restaurants` returns at most `limit` records in a stable,
///   store-defined order (creation order for the shipped backends).
#[async_trait]
pub trait RestaurantDirectory: Send + Sync {
    /// Look up one restaurant.
    async fn find_restaurant(&self, id: &RecordId) -> StorageResult<Option<RestaurantRecord>>;

    /// List up to `limit` restaurants.
    async fn list_restaurants(&self, limit: usize) -> StorageResult<Vec<RestaurantRecord>>;
}

/// Append-only review persistence.
///
/// Guarantees:
/// - `insert_review` assigns a fresh id on every call, so identical
///   submissions produce distinct records.
/// - `find_reviews` orders by `created_at` descending and honours the limit.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persist a review and return it with its assigned id.
    async fn insert_review(&self, review: NewReview) -> StorageResult<ReviewRecord>;

    /// Fetch reviews matching the query.
    async fn find_reviews(&self, query: &ReviewQuery) -> StorageResult<Vec<ReviewRecord>>;
}

/// Source of request-scoped store sessions.
///
/// A session is held for the duration of one request and released when it is
/// dropped, which covers every exit path of the caller.
#[async_trait]
pub trait SessionSource: Send + Sync {
    type Session: RestaurantDirectory + ReviewStore + Send + Sync;

    /// Acquire a session, waiting for capacity if the source is bounded.
    async fn acquire(&self) -> StorageResult<Self::Session>;
}
