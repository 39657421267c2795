//! Sistema de manejo de errores
//!
//! Este módulo define los errores del dominio (órdenes de servicio,
//! identificadores, inventario) y los errores de la aplicación junto con
//! su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::service_order::ServiceOrderStatus;

/// Errores del dominio. Ninguno se reintenta: se rechaza la solicitud.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ServiceOrderStatus,
        to: ServiceOrderStatus,
    },

    #[error("Operation not allowed: {0}")]
    OperationNotAllowed(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid license plate: {0}")]
    InvalidLicensePlate(String),

    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),

    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },
}

impl DomainError {
    /// Código estable expuesto al cliente
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DomainError::OperationNotAllowed(_) => "OPERATION_NOT_ALLOWED",
            DomainError::InvalidDocument(_) => "INVALID_DOCUMENT",
            DomainError::InvalidLicensePlate(_) => "INVALID_LICENSE_PLATE",
            DomainError::InvalidLineItem(_) => "INVALID_LINE_ITEM",
            DomainError::InvalidOrderNumber(_) => "INVALID_ORDER_NUMBER",
            DomainError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        }
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                tracing::error!("❌ Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Database Error".to_string(),
                        message: "An error occurred while accessing the database".to_string(),
                        details: None,
                        code: Some("DB_ERROR".to_string()),
                    },
                )
            }

            AppError::Validation(e) => {
                tracing::warn!("⚠️ Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::Domain(e) => {
                tracing::warn!("⚠️ Domain rule rejected request: {}", e);
                let details = match &e {
                    DomainError::InvalidTransition { from, to } => {
                        Some(json!({ "current_status": from, "requested_status": to }))
                    }
                    DomainError::InsufficientStock { requested, available } => {
                        Some(json!({ "requested": requested, "available": available }))
                    }
                    _ => None,
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse {
                        error: "Business Rule Violation".to_string(),
                        message: e.to_string(),
                        details,
                        code: Some(e.code().to_string()),
                    },
                )
            }

            AppError::Unauthorized(msg) => {
                tracing::warn!("🔒 Unauthorized access: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse {
                        error: "Unauthorized".to_string(),
                        message: msg,
                        details: None,
                        code: Some("UNAUTHORIZED".to_string()),
                    },
                )
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("🔒 Forbidden access: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse {
                        error: "Forbidden".to_string(),
                        message: msg,
                        details: None,
                        code: Some("FORBIDDEN".to_string()),
                    },
                )
            }

            AppError::NotFound(msg) => {
                tracing::info!("🔍 Resource not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error: "Not Found".to_string(),
                        message: msg,
                        details: None,
                        code: Some("NOT_FOUND".to_string()),
                    },
                )
            }

            AppError::Conflict(msg) => {
                tracing::warn!("⚠️ Conflict: {}", msg);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse {
                        error: "Conflict".to_string(),
                        message: msg,
                        details: None,
                        code: Some("CONFLICT".to_string()),
                    },
                )
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("⚠️ Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Bad Request".to_string(),
                        message: msg,
                        details: None,
                        code: Some("BAD_REQUEST".to_string()),
                    },
                )
            }

            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        details: None,
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }

            AppError::Jwt(msg) => {
                tracing::warn!("🔒 JWT error: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse {
                        error: "JWT Error".to_string(),
                        message: msg,
                        details: None,
                        code: Some("JWT_ERROR".to_string()),
                    },
                )
            }

            AppError::Hash(msg) => {
                tracing::error!("❌ Hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Hash Error".to_string(),
                        message: "An error occurred while processing credentials".to_string(),
                        details: None,
                        code: Some("HASH_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_maps_to_unprocessable_entity() {
        let error = AppError::Domain(DomainError::InvalidTransition {
            from: ServiceOrderStatus::Received,
            to: ServiceOrderStatus::Delivered,
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_transition_message_names_both_statuses() {
        let error = DomainError::InvalidTransition {
            from: ServiceOrderStatus::Delivered,
            to: ServiceOrderStatus::InExecution,
        };
        let message = error.to_string();
        assert!(message.contains("DELIVERED"));
        assert!(message.contains("IN_EXECUTION"));
        assert_eq!(error.code(), "INVALID_TRANSITION");
    }

    #[test]
    fn test_helpers_build_expected_variants() {
        assert!(matches!(not_found_error("Customer", "42"), AppError::NotFound(_)));
        assert!(matches!(conflict_error("Vehicle", "plate", "ABC1234"), AppError::Conflict(_)));
    }
}
