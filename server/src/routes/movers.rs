//! Mover directory and favorite routes.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use mover_engine::{
    viewer, FavoritePage, MoverId, MoverPage, MoverQuery, MoverSearchParams, MoverView,
    PageParams, ToggleOutcome,
};

use crate::auth::{ClientUser, OptionalAuthUser};
use crate::error::Result;
use crate::AppState;

/// Create mover routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movers", get(list_movers))
        .route("/movers/{id}", get(get_mover))
        .route("/movers/{id}/toggle-favorite", post(toggle_favorite))
        .route("/favorites/me", get(list_favorites))
}

/// GET /movers - Search, sort and page the directory.
async fn list_movers(
    State(state): State<AppState>,
    OptionalAuthUser(identity): OptionalAuthUser,
    Query(params): Query<MoverSearchParams>,
) -> Result<Json<MoverPage>> {
    let query = MoverQuery::parse(&params)?;
    let viewer = viewer(identity.as_ref());
    Ok(Json(state.backend.list_movers(query, viewer).await?))
}

/// GET /movers/{id} - One mover with the viewer's favorite flag.
async fn get_mover(
    State(state): State<AppState>,
    OptionalAuthUser(identity): OptionalAuthUser,
    Path(id): Path<String>,
) -> Result<Json<MoverView>> {
    let id = MoverId::parse(&id)?;
    let viewer = viewer(identity.as_ref());
    Ok(Json(state.backend.get_mover(id, viewer).await?))
}

/// POST /movers/{id}/toggle-favorite - Like or unlike a mover.
async fn toggle_favorite(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Path(id): Path<String>,
) -> Result<Json<ToggleOutcome>> {
    let mover = MoverId::parse(&id)?;
    Ok(Json(state.backend.toggle_favorite(client, mover).await?))
}

/// GET /favorites/me - The caller's favorite movers.
async fn list_favorites(
    State(state): State<AppState>,
    ClientUser(client): ClientUser,
    Query(params): Query<PageParams>,
) -> Result<Json<FavoritePage>> {
    Ok(Json(state.backend.list_favorites(client, params).await?))
}
