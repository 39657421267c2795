use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{
    CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters, VehicleResponse,
};
use crate::dto::{ApiResponse, PageResponse};
use crate::models::{vehicle::Vehicle, Clock, LicensePlate};
use crate::repositories::{CustomerLookup, CustomerRepository, VehicleRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::page_bounds;

pub struct VehicleController {
    repository: VehicleRepository,
    customers: CustomerRepository,
    clock: Arc<dyn Clock>,
}

impl VehicleController {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            repository: VehicleRepository::new(state.pool.clone()),
            customers: CustomerRepository::new(state.pool.clone()),
            clock: state.clock.clone(),
        }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;
        let plate = LicensePlate::new(&request.license_plate)?;

        if !self.customers.customer_exists(request.customer_id).await? {
            return Err(not_found_error("Customer", &request.customer_id.to_string()));
        }

        let now = self.clock.now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            license_plate: plate.value().to_string(),
            brand: request.brand.trim().to_string(),
            model: request.model.trim().to_string(),
            year: request.year,
            color: request.color,
            created_at: now,
            updated_at: now,
        };
        let vehicle = self.repository.create(&vehicle).await?;
        info!("🚗 Vehículo {} registrado para el cliente {}", plate, vehicle.customer_id);

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;
        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list(&self, filters: VehicleFilters) -> AppResult<PageResponse<VehicleResponse>> {
        let (limit, offset) = page_bounds(filters.limit, filters.offset);
        let vehicles = self.repository.list(filters.customer_id, limit, offset).await?;
        Ok(PageResponse {
            items: vehicles.into_iter().map(VehicleResponse::from).collect(),
            limit,
            offset,
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;
        let vehicle = self
            .repository
            .update(
                id,
                request.brand,
                request.model,
                request.year,
                request.color,
                self.clock.now(),
            )
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehicle updated".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        info!("🗑️ Vehículo {} eliminado", id);
        Ok(())
    }
}
