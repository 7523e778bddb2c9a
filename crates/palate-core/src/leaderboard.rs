//! Leaderboard composition.
//!
//! The directory decides which restaurants appear and in what order; the
//! sentiment service only contributes scores. A restaurant the service has
//! never scored gets `0.0`. Scores for restaurants the directory did not
//! return are ignored.

use std::collections::HashMap;

use palate_state::{RestaurantDirectory, RestaurantRecord, SessionSource};
use sentiment_oracle::{OracleScore, SentimentOracle};

use crate::error::{PipelineError, Result};
use crate::model::LeaderboardEntry;
use crate::obs::{self, RequestSpan};
use crate::pipeline::ReviewPipeline;
use crate::validation;

/// Attach scores to restaurants, keeping directory order.
///
/// When the service reports a restaurant twice, the first score wins.
pub fn join_scores(restaurants: Vec<RestaurantRecord>, scores: &[OracleScore]) -> Vec<LeaderboardEntry> {
    let mut by_id: HashMap<&str, f64> = HashMap::with_capacity(scores.len());
    for entry in scores {
        by_id.entry(entry.restaurant_id.as_str()).or_insert(entry.score);
    }

    restaurants
        .into_iter()
        .map(|restaurant| {
            let score = by_id.get(restaurant.id.as_str()).copied().unwrap_or(0.0);
            LeaderboardEntry::from_record(restaurant, score)
        })
        .collect()
}

impl<S, O> ReviewPipeline<S, O>
where
    S: SessionSource,
    O: SentimentOracle,
{
    /// Up to `limit` restaurants with their aggregate scores.
    ///
    /// `None` uses the configured default; values above the configured
    /// maximum are clamped; zero or negative is invalid input. The directory
    /// and the sentiment service are queried concurrently and both must
    /// succeed.
    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>> {
        let span = RequestSpan::new("leaderboard");
        let result = span.in_span(self.leaderboard_in_session(limit)).await;
        if let Err(err) = &result {
            let _guard = span.span().enter();
            obs::emit_request_rejected("leaderboard", err);
        }
        result
    }

    async fn leaderboard_in_session(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>> {
        let limit = validation::validate_limit(
            limit,
            self.config.default_leaderboard_limit,
            self.config.max_leaderboard_limit,
        )?;

        let session = self.session().await?;
        let timeout = self.config.upstream_timeout;

        let (restaurants, scores) = tokio::join!(
            self.bounded(session.list_restaurants(limit)),
            self.bounded(self.oracle.leaderboard(limit)),
        );
        let restaurants = restaurants
            .map_err(|_| PipelineError::timed_out("restaurant listing", timeout))?
            .map_err(|e| PipelineError::upstream("restaurant listing", e))?;
        let scores = scores
            .map_err(|_| PipelineError::timed_out("sentiment leaderboard", timeout))?
            .map_err(|e| PipelineError::upstream("sentiment leaderboard", e))?;

        let mut entries = join_scores(restaurants, &scores);
        entries.truncate(limit);

        let scored = entries
            .iter()
            .filter(|entry| scores.iter().any(|s| s.restaurant_id == entry.id))
            .count();
        obs::emit_leaderboard_served(limit, entries.len(), scored);
        Ok(entries)
    }
}
