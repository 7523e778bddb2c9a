//! The review pipeline: submission and review listing.
//!
//! A pipeline owns a session source and a sentiment oracle. Every public
//! operation acquires its own store session, uses it for the whole operation
//! and drops it on return, whichever path returns.

use std::future::Future;

use chrono::Utc;
use palate_state::{
    NewReview, RecordId, RestaurantDirectory, ReviewQuery, ReviewStore, SessionSource,
};
use sentiment_oracle::{SentimentOracle, SentimentRequest};
use tokio::time::error::Elapsed;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::model::{Review, SubmitReview};
use crate::obs::{self, RequestSpan};
use crate::validation;

/// Review submission, listing and leaderboard composition.
#[derive(Debug)]
pub struct ReviewPipeline<S, O> {
    pub(crate) store: S,
    pub(crate) oracle: O,
    pub(crate) config: PipelineConfig,
}

impl<S, O> ReviewPipeline<S, O>
where
    S: SessionSource,
    O: SentimentOracle,
{
    pub fn new(store: S, oracle: O) -> Self {
        Self::with_config(store, oracle, PipelineConfig::default())
    }

    pub fn with_config(store: S, oracle: O, config: PipelineConfig) -> Self {
        ReviewPipeline {
            store,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Bound `fut` by the upstream timeout.
    pub(crate) async fn bounded<F: Future>(&self, fut: F) -> std::result::Result<F::Output, Elapsed> {
        tokio::time::timeout(self.config.upstream_timeout, fut).await
    }

    /// Acquire a session for one operation.
    pub(crate) async fn session(&self) -> Result<S::Session> {
        self.bounded(self.store.acquire())
            .await
            .map_err(|_| PipelineError::timed_out("store session acquisition", self.config.upstream_timeout))?
            .map_err(|e| PipelineError::upstream("store session acquisition", e))
    }

    /// Validate, score and store a review.
    ///
    /// Order: validation, restaurant existence, sentiment scoring, then
    /// persistence. A failed validation or lookup contacts nothing further.
    /// If persistence fails after scoring, the sentiment service has already
    /// counted the review; the gap is logged as `review.persist_failed`.
    pub async fn submit_review(&self, submission: SubmitReview) -> Result<Review> {
        let span = RequestSpan::new("submit_review");
        let result = span.in_span(self.submit_in_session(submission)).await;
        if let Err(err) = &result {
            let _guard = span.span().enter();
            obs::emit_request_rejected("submit_review", err);
        }
        result
    }

    async fn submit_in_session(&self, submission: SubmitReview) -> Result<Review> {
        let restaurant_id = validation::parse_restaurant_id(&submission.restaurant_id)?;
        let text = validation::validate_review_text(&submission.text, self.config.max_review_chars)?;

        let session = self.session().await?;

        let restaurant = self
            .bounded(session.find_restaurant(&restaurant_id))
            .await
            .map_err(|_| PipelineError::timed_out("restaurant lookup", self.config.upstream_timeout))?
            .map_err(|e| PipelineError::upstream("restaurant lookup", e))?;
        if restaurant.is_none() {
            return Err(PipelineError::NotFound(format!(
                "Restaurant not found: {restaurant_id}"
            )));
        }

        let request = SentimentRequest {
            restaurant_id: restaurant_id.to_string(),
            text: text.clone(),
            user_id: submission.author_id.clone(),
        };
        let verdict = self
            .bounded(self.oracle.analyze(&request))
            .await
            .map_err(|_| PipelineError::timed_out("sentiment analysis", self.config.upstream_timeout))?
            .map_err(|e| PipelineError::upstream("sentiment analysis", e))?;
        debug!(label = %verdict.label, score = verdict.score, "review scored");

        let score = verdict.score;
        let review = NewReview {
            restaurant_id: restaurant_id.clone(),
            author_id: submission.author_id,
            text,
            sentiment_label: verdict.label,
            sentiment_score: score,
            created_at: Utc::now(),
        };
        let stored = match self.bounded(session.insert_review(review)).await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                obs::emit_review_persist_failed(restaurant_id.as_str(), score, &e);
                return Err(PipelineError::PersistenceFailure(format!(
                    "failed to store review: {e}"
                )));
            }
            Err(_) => {
                let timeout_ms = self.config.upstream_timeout.as_millis();
                obs::emit_review_persist_failed(restaurant_id.as_str(), score, &"timed out");
                return Err(PipelineError::PersistenceFailure(format!(
                    "storing review timed out after {timeout_ms}ms"
                )));
            }
        };

        obs::emit_review_submitted(
            stored.id.as_str(),
            stored.restaurant_id.as_str(),
            &stored.sentiment_label,
            stored.sentiment_score,
        );
        Ok(Review::from(stored))
    }

    /// Most recent reviews, newest first, up to the configured page size.
    ///
    /// A blank `restaurant_id` means no filter. An id naming no restaurant
    /// yields an empty list, not an error.
    pub async fn list_reviews(&self, restaurant_id: Option<&str>) -> Result<Vec<Review>> {
        let span = RequestSpan::new("list_reviews");
        let result = span.in_span(self.list_in_session(restaurant_id)).await;
        if let Err(err) = &result {
            let _guard = span.span().enter();
            obs::emit_request_rejected("list_reviews", err);
        }
        result
    }

    async fn list_in_session(&self, restaurant_id: Option<&str>) -> Result<Vec<Review>> {
        let filter: Option<RecordId> = restaurant_id
            .filter(|id| !id.trim().is_empty())
            .map(validation::parse_restaurant_id)
            .transpose()?;

        let session = self.session().await?;
        let query = ReviewQuery {
            restaurant_id: filter,
            limit: self.config.review_page_size,
        };
        let records = self
            .bounded(session.find_reviews(&query))
            .await
            .map_err(|_| PipelineError::timed_out("review listing", self.config.upstream_timeout))?
            .map_err(|e| PipelineError::upstream("review listing", e))?;

        obs::emit_reviews_listed(query.restaurant_id.as_ref().map(RecordId::as_str), records.len());
        Ok(records.into_iter().map(Review::from).collect())
    }
}
