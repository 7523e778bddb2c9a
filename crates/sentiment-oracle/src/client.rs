//! HTTP client for the sentiment service
//!
//! One `reqwest::Client` is built per oracle and reused for every call; it
//! pools connections internally. Each call carries the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::OracleError;
use crate::{OracleScore, Result, SentimentOracle, SentimentRequest, SentimentVerdict};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sentiment service configuration
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Service base URL, without a trailing path
    pub base_url: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("palate-sentiment-oracle/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl OracleConfig {
    /// Create config for a specific service URL
    pub fn new(base_url: &str) -> Self {
        OracleConfig {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create config from environment variables
    ///
    /// Reads:
    /// - NLP_SERVICE_URL (optional, default: "http://localhost:8000")
    /// - NLP_SERVICE_TIMEOUT_MS (optional, default: 5000)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("NLP_SERVICE_URL") {
            config.base_url = url;
        }
        if let Ok(raw) = std::env::var("NLP_SERVICE_TIMEOUT_MS") {
            let ms: u64 = raw.parse().map_err(|_| {
                OracleError::Config(format!("NLP_SERVICE_TIMEOUT_MS is not a number: {raw}"))
            })?;
            config.timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// Sentiment service client over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpSentimentOracle {
    config: OracleConfig,
    http_client: reqwest::Client,
}

impl HttpSentimentOracle {
    /// Create a new client
    pub fn new(config: OracleConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(OracleError::Config("base_url is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(HttpSentimentOracle {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OracleConfig::from_env()?)
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn transport_error(&self, err: reqwest::Error) -> OracleError {
        if err.is_timeout() {
            OracleError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            OracleError::Http(err.to_string())
        }
    }

    /// Check status and decode a JSON body
    async fn read_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "sentiment service returned an error");
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| OracleError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SentimentOracle for HttpSentimentOracle {
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id))]
    async fn analyze(&self, request: &SentimentRequest) -> Result<SentimentVerdict> {
        debug!("Requesting sentiment analysis");

        let response = self
            .http_client
            .post(self.endpoint("analyze-sentiment"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let verdict: SentimentVerdict = self.read_json(response).await?;
        debug!(label = %verdict.label, score = verdict.score, "sentiment received");
        Ok(verdict)
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: usize) -> Result<Vec<OracleScore>> {
        debug!("Requesting sentiment leaderboard");

        let response = self
            .http_client
            .get(self.endpoint("leaderboard"))
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read_json(response).await
    }
}
