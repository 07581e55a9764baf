use axum::Json;
use serde_json::{json, Value};

/// GET /api/health - liveness probe with build info
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "code": 200,
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}
