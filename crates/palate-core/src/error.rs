//! Pipeline error taxonomy.
//!
//! Every failure the pipeline reports is exactly one of four kinds. The
//! transport layer maps each kind to a status deterministically; the message
//! is meant for humans.

/// Review pipeline errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// Malformed or missing request data. No collaborator was contacted.
    #[error("{0}")]
    InvalidInput(String),

    /// The referenced restaurant does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The directory, review store reads, or sentiment service failed.
    #[error("{0}")]
    UpstreamFailure(String),

    /// Writing the review failed after it was scored.
    #[error("{0}")]
    PersistenceFailure(String),
}

impl PipelineError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "invalid_input",
            PipelineError::NotFound(_) => "not_found",
            PipelineError::UpstreamFailure(_) => "upstream_failure",
            PipelineError::PersistenceFailure(_) => "persistence_failure",
        }
    }

    /// Whether the caller, rather than a collaborator, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidInput(_) | PipelineError::NotFound(_)
        )
    }

    pub(crate) fn upstream(step: &str, err: impl std::fmt::Display) -> Self {
        PipelineError::UpstreamFailure(format!("{step} failed: {err}"))
    }

    pub(crate) fn timed_out(step: &str, timeout: std::time::Duration) -> Self {
        PipelineError::UpstreamFailure(format!(
            "{step} timed out after {}ms",
            timeout.as_millis()
        ))
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
