use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use bucket_proxy::handler::Invocation;

use crate::state::AppState;

/// POST /invoke - 处理一次调用事件
///
/// The HTTP status is always 200; the outcome is carried in the payload.
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Json(event): Json<Value>,
) -> Json<Value> {
    let invocation = Invocation::from_event(&event);
    Json(state.dispatcher.handle(invocation).await)
}
