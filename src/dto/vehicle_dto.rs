use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{vehicle::Vehicle, LicensePlate};
use crate::utils::validation::{validate_license_plate, validate_not_blank};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub customer_id: Uuid,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(length(min = 1, max = 80), custom = "validate_not_blank")]
    pub brand: String,
    #[validate(length(min = 1, max = 80), custom = "validate_not_blank")]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(max = 40))]
    pub color: Option<String>,
}

// Request para actualizar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 80), custom = "validate_not_blank")]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 80), custom = "validate_not_blank")]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(max = 40))]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub customer_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub license_plate: String,
    pub license_plate_formatted: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        let formatted = LicensePlate::new(&vehicle.license_plate)
            .map(|plate| plate.formatted())
            .unwrap_or_else(|_| vehicle.license_plate.clone());
        Self {
            id: vehicle.id,
            customer_id: vehicle.customer_id,
            license_plate: vehicle.license_plate,
            license_plate_formatted: formatted,
            brand: vehicle.brand,
            model: vehicle.model,
            year: vehicle.year,
            color: vehicle.color,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_vehicle_request_validation() {
        let request = CreateVehicleRequest {
            customer_id: Uuid::new_v4(),
            license_plate: "abc-1d23".to_string(),
            brand: "Fiat".to_string(),
            model: "Uno".to_string(),
            year: Some(2012),
            color: None,
        };
        assert!(request.validate().is_ok());

        let bad = CreateVehicleRequest {
            license_plate: "12-ABCD".to_string(),
            year: Some(1800),
            ..request
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("license_plate"));
        assert!(fields.contains_key("year"));
    }

    #[test]
    fn test_update_vehicle_rejects_blank_brand() {
        let request = UpdateVehicleRequest {
            brand: Some("  ".to_string()),
            model: None,
            year: None,
            color: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("brand"));
    }
}
