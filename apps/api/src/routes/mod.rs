pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/pipeline", get(handlers::handle_get_pipeline))
        .route(
            "/api/v1/pipeline/moves",
            post(handlers::handle_move_candidate),
        )
        .route(
            "/api/v1/pipeline/candidates/:candidate_id/history",
            get(handlers::handle_move_history),
        )
        .with_state(state)
}
