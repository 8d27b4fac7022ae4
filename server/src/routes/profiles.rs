//! Profile routes for the calling client or mover.

use axum::{extract::State, routing::put, Json, Router};
use mover_engine::{Client, ClientProfile, Mover, MoverProfile};

use crate::auth::{ClientUser, MoverUser};
use crate::error::Result;
use crate::extract::JsonBody;
use crate::AppState;

/// Create profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients/me", put(put_client))
        .route("/movers/me", put(put_mover))
}

/// PUT /clients/me
async fn put_client(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    JsonBody(profile): JsonBody<ClientProfile>,
) -> Result<Json<Client>> {
    Ok(Json(state.backend.upsert_client(client, profile).await?))
}

/// PUT /movers/me
async fn put_mover(
    State(state): State<AppState>,
    MoverUser(mover): MoverUser,
    JsonBody(profile): JsonBody<MoverProfile>,
) -> Result<Json<Mover>> {
    Ok(Json(state.backend.upsert_mover(mover, profile).await?))
}
