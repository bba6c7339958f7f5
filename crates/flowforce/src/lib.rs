pub mod config;
pub mod report;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

pub use routes::ApiError;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(routes::index))
        .route("/api/defaults", get(routes::defaults))
        .route("/api/preview", post(routes::preview))
        .route("/api/calculate", post(routes::calculate))
        .route("/api/bundle", post(routes::bundle))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(Arc::new(state))
}
