//! Input validation and identity parsing.
//!
//! Everything here runs before any store or service is contacted.

use palate_state::RecordId;

use crate::error::{PipelineError, Result};

/// Parse a restaurant id received as text.
pub fn parse_restaurant_id(text: &str) -> Result<RecordId> {
    RecordId::parse(text).map_err(|_| {
        PipelineError::InvalidInput(format!("restaurantId {text:?} is not a valid identifier"))
    })
}

/// Check review text is not blank and within `max_chars`.
///
/// The text is returned exactly as received; it is scored and stored
/// verbatim.
pub fn validate_review_text(text: &str, max_chars: usize) -> Result<String> {
    if text.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "review text must not be empty".to_string(),
        ));
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(PipelineError::InvalidInput(format!(
            "review text is {chars} characters; the limit is {max_chars}"
        )));
    }
    Ok(text.to_string())
}

/// Resolve a requested result limit.
///
/// Missing means `default`; zero or negative is rejected; anything above
/// `max` is clamped to `max`.
pub fn validate_limit(requested: Option<i64>, default: usize, max: usize) -> Result<usize> {
    match requested {
        None => Ok(default.min(max)),
        Some(n) if n <= 0 => Err(PipelineError::InvalidInput(format!(
            "limit must be a positive integer, got {n}"
        ))),
        Some(n) => Ok(usize::try_from(n).unwrap_or(usize::MAX).min(max)),
    }
}
