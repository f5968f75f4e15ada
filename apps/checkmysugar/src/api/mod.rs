//! # HTTP API
//!
//! One route, `/`, serving the form on GET and a prediction on POST.

mod handlers;
mod state;

pub use handlers::{PREDICTION_FAILED, index, submit};
pub use state::AppState;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
