//! Trait contract tests for RestaurantDirectory, ReviewStore and SessionSource.
//!
//! Each contract runs against the in-memory fake and the SurrealDB backend
//! (on `mem://`). Any conforming implementation must pass these.

use chrono::{Duration, Utc};
use palate_state::fakes::MemoryStore;
use palate_state::storage_traits::*;
use palate_state::SurrealStore;

// ===========================================================================
// Fixtures
// ===========================================================================

const NAMES: [&str; 3] = ["The Italian Place", "Burger Heaven", "Sushi Master"];

async fn seeded_surreal() -> (SurrealStore, Vec<RestaurantRecord>) {
    let store = SurrealStore::in_memory().await.unwrap();
    let mut seeded = Vec::new();
    for name in NAMES {
        seeded.push(store.insert_restaurant(name, "seeded").await.unwrap());
        // created_at drives listing order
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    (store, seeded)
}

fn seeded_memory() -> (MemoryStore, Vec<RestaurantRecord>) {
    let store = MemoryStore::new();
    let seeded = NAMES
        .iter()
        .map(|name| store.add_restaurant(name, "seeded"))
        .collect();
    (store, seeded)
}

fn review_for(restaurant: &RestaurantRecord, text: &str, minutes_ago: i64) -> NewReview {
    NewReview {
        restaurant_id: restaurant.id.clone(),
        author_id: "user-1".to_string(),
        text: text.to_string(),
        sentiment_label: "POSITIVE".to_string(),
        sentiment_score: 1.0,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

// ===========================================================================
// Contracts
// ===========================================================================

async fn contract_find_existing_and_missing<S: SessionSource>(
    store: &S,
    seeded: &[RestaurantRecord],
) {
    let session = store.acquire().await.unwrap();

    let found = session.find_restaurant(&seeded[1].id).await.unwrap();
    assert_eq!(found.as_ref().map(|r| r.name.as_str()), Some("Burger Heaven"));
    assert_eq!(found.unwrap().id, seeded[1].id);

    let missing = session
        .find_restaurant(&RecordId::generate())
        .await
        .unwrap();
    assert!(missing.is_none());
}

async fn contract_list_respects_limit_and_order<S: SessionSource>(
    store: &S,
    seeded: &[RestaurantRecord],
) {
    let session = store.acquire().await.unwrap();

    let all = session.list_restaurants(10).await.unwrap();
    let ids: Vec<_> = all.iter().map(|r| r.id.clone()).collect();
    let expected: Vec<_> = seeded.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, expected);

    let two = session.list_restaurants(2).await.unwrap();
    assert_eq!(two.len(), 2);
    assert_eq!(two[0].id, seeded[0].id);

    assert!(session.list_restaurants(0).await.unwrap().is_empty());
}

async fn contract_insert_assigns_fresh_ids<S: SessionSource>(
    store: &S,
    seeded: &[RestaurantRecord],
) {
    let session = store.acquire().await.unwrap();
    let review = review_for(&seeded[0], "great food", 0);

    let first = session.insert_review(review.clone()).await.unwrap();
    let second = session.insert_review(review.clone()).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.text, "great food");
    assert_eq!(first.sentiment_label, review.sentiment_label);
    assert_eq!(first.sentiment_score, review.sentiment_score);
    assert_eq!(first.restaurant_id, seeded[0].id);
}

async fn contract_find_reviews_newest_first_filtered_and_capped<S: SessionSource>(
    store: &S,
    seeded: &[RestaurantRecord],
) {
    let session = store.acquire().await.unwrap();

    for minutes_ago in [30, 10, 20] {
        session
            .insert_review(review_for(&seeded[0], &format!("a-{minutes_ago}"), minutes_ago))
            .await
            .unwrap();
    }
    session
        .insert_review(review_for(&seeded[1], "b-5", 5))
        .await
        .unwrap();

    let for_a = session
        .find_reviews(&ReviewQuery {
            restaurant_id: Some(seeded[0].id.clone()),
            limit: 20,
        })
        .await
        .unwrap();
    let texts: Vec<_> = for_a.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["a-10", "a-20", "a-30"]);

    let everything = session
        .find_reviews(&ReviewQuery {
            restaurant_id: None,
            limit: 20,
        })
        .await
        .unwrap();
    assert_eq!(everything.len(), 4);
    assert_eq!(everything[0].text, "b-5");
    assert!(everything
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    let capped = session
        .find_reviews(&ReviewQuery {
            restaurant_id: None,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);

    let none_for_c = session
        .find_reviews(&ReviewQuery {
            restaurant_id: Some(seeded[2].id.clone()),
            limit: 20,
        })
        .await
        .unwrap();
    assert!(none_for_c.is_empty());
}

async fn contract_sessions_share_state<S: SessionSource>(store: &S, seeded: &[RestaurantRecord]) {
    let inserted = {
        let writer = store.acquire().await.unwrap();
        writer
            .insert_review(review_for(&seeded[2], "shared", 1))
            .await
            .unwrap()
    };

    let reader = store.acquire().await.unwrap();
    let found = reader
        .find_reviews(&ReviewQuery {
            restaurant_id: Some(seeded[2].id.clone()),
            limit: 20,
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, inserted.id);
}

// ===========================================================================
// MemoryStore
// ===========================================================================

#[tokio::test]
async fn memory_find_existing_and_missing() {
    let (store, seeded) = seeded_memory();
    contract_find_existing_and_missing(&store, &seeded).await;
}

#[tokio::test]
async fn memory_list_respects_limit_and_order() {
    let (store, seeded) = seeded_memory();
    contract_list_respects_limit_and_order(&store, &seeded).await;
}

#[tokio::test]
async fn memory_insert_assigns_fresh_ids() {
    let (store, seeded) = seeded_memory();
    contract_insert_assigns_fresh_ids(&store, &seeded).await;
}

#[tokio::test]
async fn memory_find_reviews_newest_first_filtered_and_capped() {
    let (store, seeded) = seeded_memory();
    contract_find_reviews_newest_first_filtered_and_capped(&store, &seeded).await;
}

#[tokio::test]
async fn memory_sessions_share_state() {
    let (store, seeded) = seeded_memory();
    contract_sessions_share_state(&store, &seeded).await;
}

#[tokio::test]
async fn memory_sessions_are_released_on_drop() {
    let (store, _) = seeded_memory();
    {
        let _a = store.acquire().await.unwrap();
        let _b = store.acquire().await.unwrap();
        assert_eq!(store.open_sessions(), 2);
    }
    assert_eq!(store.sessions_acquired(), 2);
    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn memory_injected_failures_surface_as_errors() {
    let (store, seeded) = seeded_memory();
    let session = store.acquire().await.unwrap();

    store.fail_reads(true);
    assert!(session.find_restaurant(&seeded[0].id).await.is_err());
    assert!(session.list_restaurants(5).await.is_err());
    store.fail_reads(false);

    store.fail_writes(true);
    assert!(session
        .insert_review(review_for(&seeded[0], "lost", 0))
        .await
        .is_err());
    assert_eq!(store.insert_calls(), 1);
    assert!(store.reviews().is_empty());
    drop(session);

    store.fail_acquire(true);
    assert!(store.acquire().await.is_err());
    assert_eq!(store.open_sessions(), 0);
}

// ===========================================================================
// SurrealStore
// ===========================================================================

#[tokio::test]
async fn surreal_find_existing_and_missing() {
    let (store, seeded) = seeded_surreal().await;
    contract_find_existing_and_missing(&store, &seeded).await;
}

#[tokio::test]
async fn surreal_list_respects_limit_and_order() {
    let (store, seeded) = seeded_surreal().await;
    contract_list_respects_limit_and_order(&store, &seeded).await;
}

#[tokio::test]
async fn surreal_insert_assigns_fresh_ids() {
    let (store, seeded) = seeded_surreal().await;
    contract_insert_assigns_fresh_ids(&store, &seeded).await;
}

#[tokio::test]
async fn surreal_find_reviews_newest_first_filtered_and_capped() {
    let (store, seeded) = seeded_surreal().await;
    contract_find_reviews_newest_first_filtered_and_capped(&store, &seeded).await;
}

#[tokio::test]
async fn surreal_sessions_share_state() {
    let (store, seeded) = seeded_surreal().await;
    contract_sessions_share_state(&store, &seeded).await;
}
