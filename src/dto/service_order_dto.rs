use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{PartItem, ServiceItem, ServiceOrder, ServiceOrderStatus};
use crate::utils::errors::DomainError;
use crate::utils::validation::validate_not_blank;

// Línea de servicio en una solicitud
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceItemRequest {
    pub service_type_id: Uuid,
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub service_type_name: String,
    pub estimated_time_hours: Decimal,
    pub price: Decimal,
}

impl ServiceItemRequest {
    pub fn into_item(self) -> Result<ServiceItem, DomainError> {
        ServiceItem::new(
            self.service_type_id,
            self.service_type_name,
            self.estimated_time_hours,
            self.price,
        )
    }
}

// Línea de repuesto en una solicitud
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PartItemRequest {
    pub part_id: Uuid,
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub part_name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PartItemRequest {
    pub fn into_item(self) -> Result<PartItem, DomainError> {
        PartItem::new(self.part_id, self.part_name, self.quantity, self.unit_price)
    }
}

// Request para abrir una orden de servicio
#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceOrderRequest {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    #[validate(length(min = 1, max = 2000), custom = "validate_not_blank")]
    pub description: String,
    #[serde(default)]
    pub services: Vec<ServiceItemRequest>,
    #[serde(default)]
    pub parts: Vec<PartItemRequest>,
}

impl CreateServiceOrderRequest {
    /// Valida la cabecera y cada línea
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        for service in &self.services {
            service.validate()?;
        }
        for part in &self.parts {
            part.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: ServiceOrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceOrderFilters {
    pub status: Option<ServiceOrderStatus>,
    pub customer_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// Response de orden de servicio
#[derive(Debug, Serialize)]
pub struct ServiceOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub status: ServiceOrderStatus,
    pub allowed_transitions: Vec<ServiceOrderStatus>,
    pub description: String,
    pub services: Vec<ServiceItem>,
    pub parts: Vec<PartItem>,
    pub total_service_price: Decimal,
    pub total_parts_price: Decimal,
    pub total_price: Decimal,
    pub estimated_time_hours: Decimal,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ServiceOrder> for ServiceOrderResponse {
    fn from(order: &ServiceOrder) -> Self {
        Self {
            id: order.id(),
            order_number: order.order_number().to_string(),
            customer_id: order.customer_id(),
            vehicle_id: order.vehicle_id(),
            status: order.status(),
            allowed_transitions: order.status().allowed_transitions().to_vec(),
            description: order.description().to_string(),
            services: order.services().to_vec(),
            parts: order.parts().to_vec(),
            total_service_price: order.total_service_price(),
            total_parts_price: order.total_parts_price(),
            total_price: order.total_price(),
            estimated_time_hours: order.estimated_time_hours(),
            estimated_completion_date: order.estimated_completion_date(),
            started_at: order.started_at(),
            completed_at: order.completed_at(),
            delivered_at: order.delivered_at(),
            approved_at: order.approved_at(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}
