use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::router::availability_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Slot Availability API is running!" }))
        .nest("/availability", availability_routes(state))
}
