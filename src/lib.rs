//! Backend administrativo de un taller mecánico
//!
//! Órdenes de servicio con su flujo de estados, clientes, vehículos,
//! inventario de repuestos y autenticación de usuarios.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_layer, require_auth};
use crate::routes::{
    auth_routes, customer_routes, part_routes, service_order_routes, vehicle_routes,
};
use crate::state::AppState;

/// Router completo de la aplicación
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/service-orders", service_order_routes::create_service_order_router())
        .nest("/parts", part_routes::create_part_router())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .nest("/auth", auth_routes::create_auth_router())
        .merge(protected);

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
