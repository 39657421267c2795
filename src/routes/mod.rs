//! Rutas HTTP
//!
//! Un router por recurso; `build_router` en `lib.rs` los monta bajo `/api`.

pub mod auth_routes;
pub mod customer_routes;
pub mod part_routes;
pub mod service_order_routes;
pub mod vehicle_routes;

use axum::Json;
use serde_json::{json, Value};

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
