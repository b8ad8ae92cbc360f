use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/evaluate", post(handlers::evaluate))
        .route("/status", get(handlers::health_check))
        .route("/problems", get(handlers::list_problems))
        .route("/problems/:problem_id", get(handlers::get_problem))
        .route("/metrics", get(handlers::metrics_handler))
}

/// Complete application router with state attached
pub fn app(state: Arc<AppState>) -> Router {
    Router::new().merge(routes()).with_state(state)
}
