//! Utilidades de validación
//!
//! Validadores personalizados para `validator` y helpers de paginación.

use validator::ValidationError;

use crate::models::{Document, LicensePlate, OrderNumberGenerator};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Validar CPF / CNPJ (dígitos verificadores incluidos)
pub fn validate_document(value: &str) -> Result<(), ValidationError> {
    if !Document::is_valid(value) {
        let mut error = ValidationError::new("document");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"CPF (11 digits) or CNPJ (14 digits)".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de matrícula (antigua o Mercosul)
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LicensePlate::is_valid(value) {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"AAA9999 or AAA9A99".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de número de orden
pub fn validate_order_number(value: &str) -> Result<(), ValidationError> {
    if !OrderNumberGenerator::validate(value) {
        let mut error = ValidationError::new("order_number");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-NNNN".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=13).contains(&clean_phone) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Normaliza limit/offset de los listados
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
