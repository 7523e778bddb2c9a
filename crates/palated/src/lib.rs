//! Palated: the Palate review service
//!
//! HTTP surface over `palate_core::ReviewPipeline`. JSON in and out,
//! camelCase field names, errors as `{error, kind}`.
//!
//! ## Layer 3 - Service

pub mod error;
pub mod routes;

pub use error::{ApiError, ErrorBody};
pub use routes::create_router;
