//! HTTP route definitions.

mod estimates;
mod health;
mod movers;
mod profiles;
mod reviews;

pub use estimates::CreateEstimateRequest;
pub use health::HealthResponse;
pub use reviews::{CreateReviewRequest, UpdateReviewRequest};

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(profiles::routes())
        .merge(estimates::routes())
        .merge(reviews::routes())
        .merge(movers::routes())
}
