//! SurrealDB schema migrations and initialization
//!
//! Sets up the `restaurants` and `reviews` tables with their indexes.

use crate::error::StateError;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all Palate tables in SurrealDB
///
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing Palate SurrealDB schema");

    init_restaurants_table(db).await?;
    init_reviews_table(db).await?;

    info!("Palate schema initialization complete");
    Ok(())
}

/// Initialize `restaurants` table
///
/// Schema:
/// ```text
/// TABLE restaurants {
///   restaurant_id:  STRING (unique)
///   name:           STRING
///   description:    STRING
///   created_at:     DATETIME (indexed, listing order)
/// }
/// ```
///
/// Rows are created out-of-band; the pipeline only reads them.
async fn init_restaurants_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing restaurants table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS restaurants
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        DEFINE INDEX IF NOT EXISTS idx_restaurant_id ON TABLE restaurants COLUMNS restaurant_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_restaurant_created_at ON TABLE restaurants COLUMNS created_at;
    "#;

    db.query(sql)
        .await
        .and_then(|response| response.check())
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ restaurants table initialized");
    Ok(())
}

/// Initialize `reviews` table
///
/// Schema:
/// ```text
/// TABLE reviews {
///   review_id:        STRING (unique)
///   restaurant_id:    STRING (indexed)
///   author_id:        STRING
///   text:             STRING
///   sentiment_label:  STRING
///   sentiment_score:  FLOAT
///   created_at:       DATETIME
/// }
/// ```
///
/// Reviews are append-only: updates and deletes are not permitted.
async fn init_reviews_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing reviews table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS reviews
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_review_id ON TABLE reviews COLUMNS review_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_review_restaurant ON TABLE reviews COLUMNS restaurant_id;

        -- Newest-first listing, optionally per restaurant
        DEFINE INDEX IF NOT EXISTS idx_review_restaurant_created_at ON TABLE reviews COLUMNS restaurant_id, created_at;
        DEFINE INDEX IF NOT EXISTS idx_review_created_at ON TABLE reviews COLUMNS created_at;
    "#;

    db.query(sql)
        .await
        .and_then(|response| response.check())
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("✓ reviews table initialized");
    Ok(())
}
