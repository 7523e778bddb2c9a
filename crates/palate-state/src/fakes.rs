//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryStore`, a `SessionSource` whose sessions share one
//! in-memory directory and review store. It records session acquisition and
//! release, counts review inserts, and can be told to fail reads, writes or
//! acquisition so callers can exercise their error paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StorageError;
use crate::storage_traits::*;

#[derive(Debug, Default)]
struct Inner {
    restaurants: Mutex<Vec<RestaurantRecord>>,
    reviews: Mutex<Vec<ReviewRecord>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    insert_calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_acquire: AtomicBool,
}

/// In-memory directory + review store.
///
/// Clones share state, so a test can keep one handle for assertions while the
/// code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a restaurant to the directory. Listing order is insertion order.
    pub fn add_restaurant(&self, name: &str, description: &str) -> RestaurantRecord {
        let record = RestaurantRecord {
            id: RecordId::generate(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        self.inner
            .restaurants
            .lock()
            .unwrap()
            .push(record.clone());
        record
    }

    /// Every persisted review, in insertion order.
    pub fn reviews(&self) -> Vec<ReviewRecord> {
        self.inner.reviews.lock().unwrap().clone()
    }

    pub fn sessions_acquired(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    pub fn sessions_released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Sessions acquired but not yet dropped.
    pub fn open_sessions(&self) -> usize {
        self.sessions_acquired() - self.sessions_released()
    }

    /// Number of `insert_review` calls, including failed ones.
    pub fn insert_calls(&self) -> usize {
        self.inner.insert_calls.load(Ordering::SeqCst)
    }

    /// Make directory and review reads fail.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make review inserts fail.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make session acquisition fail.
    pub fn fail_acquire(&self, fail: bool) {
        self.inner.fail_acquire.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionSource for MemoryStore {
    type Session = MemorySession;

    async fn acquire(&self) -> StorageResult<MemorySession> {
        if self.inner.fail_acquire.load(Ordering::SeqCst) {
            return Err(StorageError::PoolExhausted { waited_ms: 0 });
        }
        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession {
            inner: Arc::clone(&self.inner),
        })
    }
}

/// Session over a [`MemoryStore`]; counts as released when dropped.
#[derive(Debug)]
pub struct MemorySession {
    inner: Arc<Inner>,
}

impl MemorySession {
    fn check_reads(&self) -> StorageResult<()> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected read failure".to_string()));
        }
        Ok(())
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.inner.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RestaurantDirectory for MemorySession {
    async fn find_restaurant(&self, id: &RecordId) -> StorageResult<Option<RestaurantRecord>> {
        self.check_reads()?;
        let restaurants = self.inner.restaurants.lock().unwrap();
        Ok(restaurants.iter().find(|r| &r.id == id).cloned())
    }

    async fn list_restaurants(&self, limit: usize) -> StorageResult<Vec<RestaurantRecord>> {
        self.check_reads()?;
        let restaurants = self.inner.restaurants.lock().unwrap();
        Ok(restaurants.iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl ReviewStore for MemorySession {
    async fn insert_review(&self, review: NewReview) -> StorageResult<ReviewRecord> {
        self.inner.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected write failure".to_string()));
        }
        let record = ReviewRecord::assign(RecordId::generate(), review);
        self.inner.reviews.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_reviews(&self, query: &ReviewQuery) -> StorageResult<Vec<ReviewRecord>> {
        self.check_reads()?;
        let reviews = self.inner.reviews.lock().unwrap();
        let mut matching: Vec<ReviewRecord> = reviews
            .iter()
            .filter(|r| {
                query
                    .restaurant_id
                    .as_ref()
                    .map(|rid| &r.restaurant_id == rid)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(query.limit);
        Ok(matching)
    }
}
