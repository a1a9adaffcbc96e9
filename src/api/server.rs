use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// GET /api/health - 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "message": "bucket-proxy 服务运行正常"
    }))
}

/// GET /api/version - 获取版本信息
pub async fn get_version_info() -> Json<Value> {
    Json(json!({
        "code": 200,
        "data": {
            "backend_version": env!("CARGO_PKG_VERSION"),
            "build_time": env!("BUILD_TIME")
        }
    }))
}

/// GET /api/drivers - 列出已注册的存储驱动
pub async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Value> {
    let drivers = state.registry.list_driver_infos().await;

    Json(json!({
        "code": 200,
        "data": {
            "active": {
                "driver_type": state.config.storage.driver,
                "name": state.dispatcher.driver().name(),
                "bucket": state.dispatcher.driver().bucket()
            },
            "drivers": drivers
        }
    }))
}
