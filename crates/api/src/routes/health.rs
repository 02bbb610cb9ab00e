//! Liveness endpoint.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::AppState;

/// Reports process liveness. Does not touch the database, so it stays
/// answerable while the pool is saturated.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates the health route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
