pub mod invoke;
pub mod server;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the HTTP router / 构建路由
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/version", get(server::get_version_info))
        .route("/api/drivers", get(server::list_drivers))
        .route("/invoke", post(invoke::invoke))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
