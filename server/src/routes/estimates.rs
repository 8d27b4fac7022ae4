//! Move request and estimate routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use mover_engine::{Estimate, EstimateId, MoveRequest, NewMoveRequest, RequestId};
use serde::{Deserialize, Serialize};

use crate::auth::{ClientUser, MoverUser};
use crate::error::Result;
use crate::extract::JsonBody;
use crate::AppState;

/// Request body for submitting an estimate.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEstimateRequest {
    pub request_id: String,
    pub price: u64,
    #[serde(default)]
    pub comment: String,
}

/// Create estimate lifecycle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request))
        .route("/estimates", post(create_estimate))
        .route("/estimates/{id}/confirm", post(confirm_estimate))
}

/// POST /requests - A client asks for quotes.
async fn create_request(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    JsonBody(body): JsonBody<NewMoveRequest>,
) -> Result<(StatusCode, Json<MoveRequest>)> {
    let request = state.backend.create_request(client, body).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /estimates - A mover quotes a request.
async fn create_estimate(
    State(state): State<AppState>,
    MoverUser(mover): MoverUser,
    JsonBody(body): JsonBody<CreateEstimateRequest>,
) -> Result<(StatusCode, Json<Estimate>)> {
    let request = RequestId::parse(&body.request_id)?;
    let client = state.backend.request_owner(request).await?;
    let estimate = state
        .backend
        .create_estimate(mover, client, request, body.price, &body.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(estimate)))
}

/// POST /estimates/{id}/confirm - The client accepts an estimate.
async fn confirm_estimate(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<String>,
) -> Result<Json<Estimate>> {
    let id = EstimateId::parse(&id)?;
    Ok(Json(state.backend.confirm_estimate(client, id).await?))
}
