use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::server::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/api/voices", get(handlers::list_voices))
        .route("/api/synthesize", post(handlers::synthesize))
        .route("/api/clips/{id}/{format}", get(handlers::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
