//! SurrealDB store - connection, session pool and operations
//!
//! `SurrealStore` owns the engine connection and a bounded pool of session
//! permits. Each request acquires a `SurrealSession`, which implements the
//! directory and review store traits and returns its permit when dropped.
//!
//! Supports in-memory (`mem://`), embedded (`surrealkv://`) and remote
//! (`ws://`, `wss://`) connections through the `any` engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, instrument, trace};

use crate::error::{StateError, StorageError};
use crate::migrations;
use crate::schema::{RestaurantRow, ReviewRow};
use crate::storage_traits::{
    NewReview, RecordId, RestaurantDirectory, RestaurantRecord, ReviewQuery, ReviewRecord,
    ReviewStore, SessionSource, StorageResult,
};
use crate::Result;

const DEFAULT_URL: &str = "mem://";
const DEFAULT_NAMESPACE: &str = "palate";
const DEFAULT_DATABASE: &str = "main";
const DEFAULT_MAX_SESSIONS: usize = 16;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials for an authenticated SurrealDB connection
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

/// Configuration for the SurrealDB store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Engine URL (e.g. "mem://", "surrealkv://data/palate", "wss://host")
    pub url: String,
    /// Namespace (default: "palate")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Sign-in credentials, if the server requires them
    pub credentials: Option<Credentials>,
    /// Maximum number of concurrently held sessions
    pub max_sessions: usize,
    /// How long `acquire` waits for a free session
    pub acquire_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            credentials: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Create a configuration for the given engine URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Sign in with the given credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Bound the number of concurrent sessions
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Set how long session acquisition may wait
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - PALATE_DB_URL (optional, default: "mem://")
    /// - PALATE_DB_NAMESPACE (optional, default: "palate")
    /// - PALATE_DB_DATABASE (optional, default: "main")
    /// - PALATE_DB_USERNAME / PALATE_DB_PASSWORD (optional, both or neither)
    /// - PALATE_DB_ROOT (optional, default: "false")
    /// - PALATE_DB_MAX_SESSIONS (optional, default: 16)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PALATE_DB_URL") {
            config.url = url;
        }
        if let Ok(ns) = std::env::var("PALATE_DB_NAMESPACE") {
            config.namespace = ns;
        }
        if let Ok(db) = std::env::var("PALATE_DB_DATABASE") {
            config.database = db;
        }

        match (
            std::env::var("PALATE_DB_USERNAME"),
            std::env::var("PALATE_DB_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => {
                let is_root = std::env::var("PALATE_DB_ROOT")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false);
                config.credentials = Some(Credentials {
                    username,
                    password,
                    is_root,
                });
            }
            (Err(_), Err(_)) => {}
            _ => {
                return Err(StateError::Config(
                    "PALATE_DB_USERNAME and PALATE_DB_PASSWORD must be set together".to_string(),
                ))
            }
        }

        if let Ok(raw) = std::env::var("PALATE_DB_MAX_SESSIONS") {
            config.max_sessions = raw.parse().map_err(|_| {
                StateError::Config(format!("PALATE_DB_MAX_SESSIONS is not a number: {raw}"))
            })?;
        }

        Ok(config)
    }
}

/// SurrealDB store for restaurants and reviews
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Any>,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl SurrealStore {
    /// Connect, authenticate if configured, select ns/db and run migrations
    #[instrument(skip(config), fields(url = %config.url, namespace = %config.namespace, database = %config.database))]
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        if config.max_sessions == 0 {
            return Err(StateError::Config(
                "max_sessions must be at least 1".to_string(),
            ));
        }

        info!("Connecting to SurrealDB");

        let db = surrealdb::engine::any::connect(config.url.as_str())
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to connect to {}: {}", config.url, e))
            })?;

        if let Some(creds) = &config.credentials {
            if creds.is_root {
                db.signin(Root {
                    username: &creds.username,
                    password: &creds.password,
                })
                .await
                .map_err(|e| StateError::Connection(format!("Root authentication failed: {e}")))?;
            } else {
                db.signin(Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username: &creds.username,
                    password: &creds.password,
                })
                .await
                .map_err(|e| {
                    StateError::Connection(format!("Database authentication failed: {e}"))
                })?;
            }
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to select namespace/database: {e}"))
            })?;

        migrations::init_schema(&db).await?;

        info!(max_sessions = config.max_sessions, "SurrealDB connected");
        Ok(Self {
            db,
            permits: Arc::new(Semaphore::new(config.max_sessions)),
            acquire_timeout: config.acquire_timeout,
        })
    }

    /// Connect to a fresh in-memory database with default settings
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&StoreConfig::default()).await
    }

    /// Connect using environment variables (see [`StoreConfig::from_env`])
    pub async fn from_env() -> Result<Self> {
        let config = StoreConfig::from_env()?;
        Self::connect(&config).await
    }

    /// Number of sessions that can be acquired right now
    pub fn available_sessions(&self) -> usize {
        self.permits.available_permits()
    }

    /// Create a restaurant directly in the directory.
    ///
    /// Restaurants are created out-of-band from the review pipeline; this is
    /// the administrative entry point for that.
    #[instrument(skip(self, description))]
    pub async fn insert_restaurant(
        &self,
        name: &str,
        description: &str,
    ) -> StorageResult<RestaurantRecord> {
        let row = RestaurantRow::new(name, description);

        let created: Option<RestaurantRow> = self.db.create("restaurants").content(row).await?;

        let record = created
            .ok_or_else(|| StorageError::Backend("failed to create restaurant".to_string()))?
            .into_record()?;
        info!(restaurant_id = %record.id, "restaurant created");
        Ok(record)
    }
}

#[async_trait]
impl SessionSource for SurrealStore {
    type Session = SurrealSession;

    async fn acquire(&self) -> StorageResult<SurrealSession> {
        let permit = tokio::time::timeout(self.acquire_timeout, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| StorageError::PoolExhausted {
                waited_ms: self.acquire_timeout.as_millis() as u64,
            })?
            .map_err(|e| StorageError::Backend(format!("session pool closed: {e}")))?;

        trace!(available = self.permits.available_permits(), "store session acquired");
        Ok(SurrealSession {
            db: self.db.clone(),
            _permit: permit,
        })
    }
}

/// A request-scoped view of the store. Dropping it releases its pool slot.
pub struct SurrealSession {
    db: Surreal<Any>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for SurrealSession {
    fn drop(&mut self) {
        trace!("store session released");
    }
}

#[async_trait]
impl RestaurantDirectory for SurrealSession {
    async fn find_restaurant(&self, id: &RecordId) -> StorageResult<Option<RestaurantRecord>> {
        debug!(restaurant_id = %id, "finding restaurant");

        let mut result = self
            .db
            .query("SELECT * FROM restaurants WHERE restaurant_id = $rid LIMIT 1")
            .bind(("rid", id.to_string()))
            .await?;

        let rows: Vec<RestaurantRow> = result.take(0)?;
        rows.into_iter().next().map(RestaurantRow::into_record).transpose()
    }

    async fn list_restaurants(&self, limit: usize) -> StorageResult<Vec<RestaurantRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(format!(
                "SELECT * FROM restaurants ORDER BY created_at ASC LIMIT {limit}"
            ))
            .await?;

        let rows: Vec<RestaurantRow> = result.take(0)?;
        rows.into_iter().map(RestaurantRow::into_record).collect()
    }
}

#[async_trait]
impl ReviewStore for SurrealSession {
    async fn insert_review(&self, review: NewReview) -> StorageResult<ReviewRecord> {
        let review_id = RecordId::generate();
        let row = ReviewRow::from_new(&review_id, &review);

        debug!(review_id = %review_id, restaurant_id = %review.restaurant_id, "inserting review");

        let created: Option<ReviewRow> = self.db.create("reviews").content(row).await?;

        created
            .ok_or_else(|| StorageError::Backend("failed to create review".to_string()))?
            .into_record()
    }

    async fn find_reviews(&self, query: &ReviewQuery) -> StorageResult<Vec<ReviewRecord>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let rows: Vec<ReviewRow> = match &query.restaurant_id {
            Some(rid) => {
                let mut res = self
                    .db
                    .query(format!(
                        "SELECT * FROM reviews WHERE restaurant_id = $rid ORDER BY created_at DESC LIMIT {}",
                        query.limit
                    ))
                    .bind(("rid", rid.to_string()))
                    .await?;
                res.take(0)?
            }
            None => {
                let mut res = self
                    .db
                    .query(format!(
                        "SELECT * FROM reviews ORDER BY created_at DESC LIMIT {}",
                        query.limit
                    ))
                    .await?;
                res.take(0)?
            }
        };

        rows.into_iter().map(ReviewRow::into_record).collect()
    }
}
