pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::scoring::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring API
        .route("/api/v1/scoring/defaults", get(handlers::handle_defaults))
        .route("/api/v1/scoring/score", post(handlers::handle_score))
        .route("/api/v1/scoring/rank", post(handlers::handle_rank))
        .fallback(not_found)
        .with_state(state)
}
