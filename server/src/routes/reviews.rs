//! Review endpoint routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use mover_engine::{
    DeletedReview, EstimateId, EstimatePage, MoverId, PageParams, Review, ReviewId, ReviewInput,
    ReviewPage,
};
use serde::{Deserialize, Serialize};

use crate::auth::ClientUser;
use crate::error::Result;
use crate::extract::JsonBody;
use crate::AppState;

/// Request body for creating a review.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub estimate_id: String,
    pub rating: i64,
    pub content: String,
}

/// Request body for updating a review.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: i64,
    pub content: String,
}

/// Create review routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/me", get(list_my_reviews))
        .route("/reviews/writable", get(list_writable_estimates))
        .route("/reviews/mover/{mover_id}", get(list_mover_reviews))
        .route("/reviews/{id}", patch(update_review).delete(delete_review))
}

/// POST /reviews - Review a confirmed estimate.
async fn create_review(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    JsonBody(body): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let estimate = EstimateId::parse(&body.estimate_id)?;
    let review = state
        .backend
        .create_review(client, estimate, ReviewInput::new(body.rating, body.content))
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /reviews/me - Reviews written by the caller.
async fn list_my_reviews(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Query(params): Query<PageParams>,
) -> Result<Json<ReviewPage>> {
    Ok(Json(state.backend.list_my_reviews(client, params).await?))
}

/// GET /reviews/mover/{mover_id} - Public reviews of a mover.
async fn list_mover_reviews(
    State(state): State<AppState>,
    Path(mover_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ReviewPage>> {
    let mover = MoverId::parse(&mover_id)?;
    Ok(Json(state.backend.list_mover_reviews(mover, params).await?))
}

/// GET /reviews/writable - Confirmed estimates the caller can still review.
async fn list_writable_estimates(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Query(params): Query<PageParams>,
) -> Result<Json<EstimatePage>> {
    Ok(Json(
        state.backend.list_writable_estimates(client, params).await?,
    ))
}

/// PATCH /reviews/{id} - Edit the caller's review.
async fn update_review(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateReviewRequest>,
) -> Result<Json<Review>> {
    let id = ReviewId::parse(&id)?;
    let review = state
        .backend
        .update_review(client, id, ReviewInput::new(body.rating, body.content))
        .await?;
    Ok(Json(review))
}

/// DELETE /reviews/{id} - Remove the caller's review.
async fn delete_review(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedReview>> {
    let id = ReviewId::parse(&id)?;
    Ok(Json(state.backend.delete_review(client, id).await?))
}
