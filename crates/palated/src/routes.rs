//! Router construction and request handlers.
//!
//! POST /api/reviews             submit a review
//! GET  /api/reviews             recent reviews, optionally by restaurant
//! GET  /api/leaderboard         restaurants with aggregate scores
//! GET  /health                  liveness

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use palate_core::{LeaderboardEntry, Review, ReviewPipeline, SubmitReview};
use palate_state::SessionSource;
use sentiment_oracle::SentimentOracle;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

type Pipeline<S, O> = Arc<ReviewPipeline<S, O>>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsParams {
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
}

/// Build the full router over a shared pipeline.
pub fn create_router<S, O>(pipeline: Pipeline<S, O>) -> Router
where
    S: SessionSource + 'static,
    O: SentimentOracle + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/reviews",
            get(list_reviews::<S, O>).post(submit_review::<S, O>),
        )
        .route("/api/leaderboard", get(leaderboard::<S, O>))
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn submit_review<S, O>(
    State(pipeline): State<Pipeline<S, O>>,
    payload: Result<Json<SubmitReview>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), ApiError>
where
    S: SessionSource + 'static,
    O: SentimentOracle + 'static,
{
    let Json(submission) = payload?;
    let review = pipeline.submit_review(submission).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn list_reviews<S, O>(
    State(pipeline): State<Pipeline<S, O>>,
    params: Result<Query<ReviewsParams>, QueryRejection>,
) -> Result<Json<Vec<Review>>, ApiError>
where
    S: SessionSource + 'static,
    O: SentimentOracle + 'static,
{
    let Query(params) = params?;
    let reviews = pipeline
        .list_reviews(params.restaurant_id.as_deref())
        .await?;
    Ok(Json(reviews))
}

async fn leaderboard<S, O>(
    State(pipeline): State<Pipeline<S, O>>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError>
where
    S: SessionSource + 'static,
    O: SentimentOracle + 'static,
{
    let Query(params) = params?;
    let entries = pipeline.leaderboard(params.limit).await?;
    Ok(Json(entries))
}

async fn unknown_route() -> ApiError {
    ApiError::not_found("no such route")
}
