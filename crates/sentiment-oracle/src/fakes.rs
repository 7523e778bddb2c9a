//! Scripted sentiment oracle (testing only)
//!
//! `ScriptedOracle` answers every `analyze` call with a configured verdict and
//! folds the score into a per-restaurant aggregate, the way the real service
//! keeps its leaderboard. Failures and latency can be injected, and every call
//! is counted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::{OracleError, OracleScore, Result, SentimentOracle, SentimentRequest, SentimentVerdict};

#[derive(Debug)]
struct Inner {
    verdict: Mutex<SentimentVerdict>,
    aggregates: Mutex<HashMap<String, f64>>,
    analyze_failure: Mutex<Option<OracleError>>,
    leaderboard_failure: Mutex<Option<OracleError>>,
    latency: Mutex<Option<Duration>>,
    requests: Mutex<Vec<SentimentRequest>>,
    requested_limits: Mutex<Vec<usize>>,
    analyze_calls: AtomicUsize,
    leaderboard_calls: AtomicUsize,
}

/// Scripted, call-counting oracle. Clones share state.
#[derive(Debug, Clone)]
pub struct ScriptedOracle {
    inner: Arc<Inner>,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedOracle {
    /// Oracle that labels everything `POSITIVE` with score `1.0`.
    pub fn new() -> Self {
        ScriptedOracle {
            inner: Arc::new(Inner {
                verdict: Mutex::new(SentimentVerdict {
                    label: "POSITIVE".to_string(),
                    score: 1.0,
                    confidence: None,
                }),
                aggregates: Mutex::new(HashMap::new()),
                analyze_failure: Mutex::new(None),
                leaderboard_failure: Mutex::new(None),
                latency: Mutex::new(None),
                requests: Mutex::new(Vec::new()),
                requested_limits: Mutex::new(Vec::new()),
                analyze_calls: AtomicUsize::new(0),
                leaderboard_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Answer `analyze` with this label and score.
    pub fn with_verdict(self, label: &str, score: f64) -> Self {
        *self.inner.verdict.lock().unwrap() = SentimentVerdict {
            label: label.to_string(),
            score,
            confidence: None,
        };
        self
    }

    /// Preset the aggregate score for a restaurant.
    pub fn with_score(self, restaurant_id: &str, score: f64) -> Self {
        self.inner
            .aggregates
            .lock()
            .unwrap()
            .insert(restaurant_id.to_string(), score);
        self
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.inner.latency.lock().unwrap() = Some(latency);
        self
    }

    /// Make `analyze` fail with `error` (or succeed again with `None`).
    pub fn fail_analyze(&self, error: Option<OracleError>) {
        *self.inner.analyze_failure.lock().unwrap() = error;
    }

    /// Make `leaderboard` fail with `error` (or succeed again with `None`).
    pub fn fail_leaderboard(&self, error: Option<OracleError>) {
        *self.inner.leaderboard_failure.lock().unwrap() = error;
    }

    pub fn analyze_calls(&self) -> usize {
        self.inner.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn leaderboard_calls(&self) -> usize {
        self.inner.leaderboard_calls.load(Ordering::SeqCst)
    }

    /// Every request passed to `analyze`, in call order.
    pub fn requests(&self) -> Vec<SentimentRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// Every limit passed to `leaderboard`, in call order.
    pub fn requested_limits(&self) -> Vec<usize> {
        self.inner.requested_limits.lock().unwrap().clone()
    }

    /// Current aggregate for a restaurant, if any.
    pub fn aggregate(&self, restaurant_id: &str) -> Option<f64> {
        self.inner
            .aggregates
            .lock()
            .unwrap()
            .get(restaurant_id)
            .copied()
    }

    async fn simulate_latency(&self) {
        let latency = *self.inner.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl SentimentOracle for ScriptedOracle {
    async fn analyze(&self, request: &SentimentRequest) -> Result<SentimentVerdict> {
        self.inner.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.requests.lock().unwrap().push(request.clone());
        self.simulate_latency().await;

        if let Some(err) = self.inner.analyze_failure.lock().unwrap().clone() {
            return Err(err);
        }

        let verdict = self.inner.verdict.lock().unwrap().clone();
        *self
            .inner
            .aggregates
            .lock()
            .unwrap()
            .entry(request.restaurant_id.clone())
            .or_insert(0.0) += verdict.score;
        Ok(verdict)
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<OracleScore>> {
        self.inner.leaderboard_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.requested_limits.lock().unwrap().push(limit);
        self.simulate_latency().await;

        if let Some(err) = self.inner.leaderboard_failure.lock().unwrap().clone() {
            return Err(err);
        }

        let mut scores: Vec<OracleScore> = self
            .inner
            .aggregates
            .lock()
            .unwrap()
            .iter()
            .map(|(id, score)| OracleScore {
                restaurant_id: id.clone(),
                score: *score,
            })
            .collect();
        // Highest first, like a sorted-set reverse range
        scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.restaurant_id.cmp(&b.restaurant_id))
        });
        scores.truncate(limit);
        Ok(scores)
    }
}
