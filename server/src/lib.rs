//! Mover Server - HTTP surface of the mover marketplace.
//!
//! Clients request moves, movers quote them, and clients review confirmed
//! jobs and keep a list of favorite movers. Every rule lives in
//! `mover-engine`; this crate exposes it over HTTP and persists it either in
//! PostgreSQL or in the engine's in-memory store.

pub mod auth;
pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::Backend;
use crate::config::Config;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(backend: Backend, config: Config) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
