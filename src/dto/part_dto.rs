use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::part::Part;
use crate::utils::validation::validate_not_blank;

// Request para dar de alta un repuesto
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartRequest {
    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub code: String,
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub name: String,
    pub unit_price: Decimal,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    #[validate(range(min = 0))]
    pub minimum_stock: i32,
}

// Entrada o salida de stock
#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartFilters {
    pub below_minimum: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PartResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub unit_price: Decimal,
    pub stock_quantity: i32,
    pub minimum_stock: i32,
    pub below_minimum: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Part> for PartResponse {
    fn from(part: Part) -> Self {
        Self {
            below_minimum: part.is_below_minimum(),
            id: part.id,
            code: part.code,
            name: part.name,
            unit_price: part.unit_price,
            stock_quantity: part.stock_quantity,
            minimum_stock: part.minimum_stock,
            created_at: part.created_at,
            updated_at: part.updated_at,
        }
    }
}
