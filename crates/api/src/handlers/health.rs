use axum::Json;
use serde_json::{json, Value};

pub fn health_body(service: &str) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": service,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
