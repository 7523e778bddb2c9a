//! Palate-State: SurrealDB Backend for Palate
//!
//! This crate provides the persistence layer for the review pipeline: the
//! restaurant directory and the review store.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: opaque identity, append-only reviews, request-scoped sessions.
//!
//! ## Key Components
//!
//! - `SurrealStore`: Manages the connection, migrations and the session pool
//! - `SurrealSession`: Request-scoped directory + review store
//! - `RecordId`: Opaque identifier with a canonical text form
//! - `fakes::MemoryStore`: In-memory implementation for tests

mod error;
pub mod fakes;
mod handle;
pub mod migrations;
mod schema;
pub mod storage_traits;

pub use error::{StateError, StorageError};
pub use handle::{Credentials, StoreConfig, SurrealSession, SurrealStore};
pub use schema::{RestaurantRow, ReviewRow};
pub use storage_traits::{
    NewReview, RecordId, RestaurantDirectory, RestaurantRecord, ReviewQuery, ReviewRecord,
    ReviewStore, SessionSource, StorageResult, MAX_RECORD_ID_LEN,
};

/// Result type for palate-state setup operations
pub type Result<T> = std::result::Result<T, StateError>;
