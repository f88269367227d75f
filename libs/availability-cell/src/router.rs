use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/next-slots", post(handlers::get_next_slots))
        .route("/validate", post(handlers::validate_availability))
        .with_state(state)
}
