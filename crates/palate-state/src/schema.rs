//! Row definitions for Palate SurrealDB tables
//!
//! Tables:
//! - restaurants: restaurant directory entries
//! - reviews: scored, immutable reviews
//!
//! Rows carry the opaque id as a plain string column (`restaurant_id`,
//! `review_id`) with a unique index, and convert to/from the
//! `storage_traits` records at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage_traits::{
    NewReview, RecordId, RestaurantRecord, ReviewRecord, StorageResult,
};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

fn parse_stored_id(column: &str, value: String) -> StorageResult<RecordId> {
    RecordId::parse(&value)
        .map_err(|_| StorageError::Serialization(format!("{column} {value:?} is not a record id")))
}

/// Restaurant row stored in SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantRow {
    /// SurrealDB record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    /// Opaque restaurant id
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl RestaurantRow {
    /// Create a row for a new restaurant with a freshly minted id
    pub fn new(name: &str, description: &str) -> Self {
        RestaurantRow {
            id: None,
            restaurant_id: RecordId::generate().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn into_record(self) -> StorageResult<RestaurantRecord> {
        Ok(RestaurantRecord {
            id: parse_stored_id("restaurant_id", self.restaurant_id)?,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

/// Review row stored in SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    /// SurrealDB record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    /// Opaque review id
    pub review_id: String,
    pub restaurant_id: String,
    pub author_id: String,
    pub text: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    /// Build a row for `review` under the given id
    pub fn from_new(review_id: &RecordId, review: &NewReview) -> Self {
        ReviewRow {
            id: None,
            review_id: review_id.to_string(),
            restaurant_id: review.restaurant_id.to_string(),
            author_id: review.author_id.clone(),
            text: review.text.clone(),
            sentiment_label: review.sentiment_label.clone(),
            sentiment_score: review.sentiment_score,
            created_at: review.created_at,
        }
    }

    pub fn into_record(self) -> StorageResult<ReviewRecord> {
        Ok(ReviewRecord {
            id: parse_stored_id("review_id", self.review_id)?,
            restaurant_id: parse_stored_id("restaurant_id", self.restaurant_id)?,
            author_id: self.author_id,
            text: self.text,
            sentiment_label: self.sentiment_label,
            sentiment_score: self.sentiment_score,
            created_at: self.created_at,
        })
    }
}
