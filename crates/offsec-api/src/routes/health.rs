use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// Liveness. Needs no identity.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
