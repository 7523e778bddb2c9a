//! Pipeline tuning.

use std::time::Duration;

/// Limits and timeouts applied by [`crate::ReviewPipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Leaderboard size when the caller gives none
    pub default_leaderboard_limit: usize,
    /// Larger requested leaderboards are clamped to this
    pub max_leaderboard_limit: usize,
    /// Maximum reviews returned by a listing
    pub review_page_size: usize,
    /// Maximum review length in characters
    pub max_review_chars: usize,
    /// Bound on every store or sentiment call, and on session acquisition
    pub upstream_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            default_leaderboard_limit: 10,
            max_leaderboard_limit: 100,
            review_page_size: 20,
            max_review_chars: 5000,
            upstream_timeout: Duration::from_secs(5),
        }
    }
}

impl PipelineConfig {
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    pub fn with_review_page_size(mut self, size: usize) -> Self {
        self.review_page_size = size;
        self
    }

    pub fn with_leaderboard_limits(mut self, default: usize, max: usize) -> Self {
        self.default_leaderboard_limit = default;
        self.max_leaderboard_limit = max;
        self
    }

    pub fn with_max_review_chars(mut self, max: usize) -> Self {
        self.max_review_chars = max;
        self
    }
}
