//! Casos de uso de órdenes de servicio
//!
//! Cada mutación sigue el ciclo cargar → mutar el agregado → guardar con
//! control optimista sobre `updated_at`.

use chrono::Datelike;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dto::service_order_dto::{
    ChangeStatusRequest, CreateServiceOrderRequest, PartItemRequest, ServiceItemRequest,
    ServiceOrderFilters, ServiceOrderResponse,
};
use crate::dto::{ApiResponse, PageResponse};
use crate::models::{Clock, NewServiceOrder, OrderNumberGenerator, ServiceOrder};
use crate::repositories::{
    CustomerLookup, CustomerRepository, PgServiceOrderRepository, ServiceOrderQuery,
    ServiceOrderStore, VehicleLookup, VehicleRepository,
};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult, DomainError};
use crate::utils::validation::page_bounds;

/// Intentos de alta cuando otro proceso tomó el mismo número de orden
const ORDER_NUMBER_ATTEMPTS: usize = 3;

pub struct ServiceOrderController {
    orders: Arc<dyn ServiceOrderStore>,
    customers: Arc<dyn CustomerLookup>,
    vehicles: Arc<dyn VehicleLookup>,
    clock: Arc<dyn Clock>,
}

impl ServiceOrderController {
    pub fn new(
        orders: Arc<dyn ServiceOrderStore>,
        customers: Arc<dyn CustomerLookup>,
        vehicles: Arc<dyn VehicleLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            customers,
            vehicles,
            clock,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::new(PgServiceOrderRepository::new(state.pool.clone())),
            Arc::new(CustomerRepository::new(state.pool.clone())),
            Arc::new(VehicleRepository::new(state.pool.clone())),
            state.clock.clone(),
        )
    }

    pub async fn create(
        &self,
        request: CreateServiceOrderRequest,
    ) -> AppResult<ApiResponse<ServiceOrderResponse>> {
        request.validate_all()?;

        if !self.customers.customer_exists(request.customer_id).await? {
            return Err(not_found_error("Customer", &request.customer_id.to_string()));
        }
        if !self
            .vehicles
            .vehicle_belongs_to(request.vehicle_id, request.customer_id)
            .await?
        {
            return Err(AppError::BadRequest(format!(
                "Vehicle '{}' does not belong to customer '{}'",
                request.vehicle_id, request.customer_id
            )));
        }

        let services = request
            .services
            .into_iter()
            .map(ServiceItemRequest::into_item)
            .collect::<Result<Vec<_>, DomainError>>()?;
        let parts = request
            .parts
            .into_iter()
            .map(PartItemRequest::into_item)
            .collect::<Result<Vec<_>, DomainError>>()?;

        let mut input = NewServiceOrder {
            order_number: None,
            customer_id: request.customer_id,
            vehicle_id: request.vehicle_id,
            description: request.description,
            services,
            parts,
        };

        let mut attempt = 1;
        let order = loop {
            let now = self.clock.now();
            let count = self.orders.count_by_year(now.year()).await?;
            if OrderNumberGenerator::sequence_exhausted(count) {
                error!("❌ Secuencia de órdenes agotada para {}", now.year());
                return Err(AppError::Internal(format!(
                    "Order number sequence for {} is exhausted ({} orders)",
                    now.year(),
                    OrderNumberGenerator::MAX_SEQUENCE
                )));
            }
            input.order_number = Some(OrderNumberGenerator::generate_at(now, count));

            let order = ServiceOrder::create(input.clone(), self.clock.as_ref())?;
            match self.orders.insert(&order).await {
                Ok(()) => break order,
                Err(AppError::Conflict(msg)) if attempt < ORDER_NUMBER_ATTEMPTS => {
                    warn!("⚠️ Número de orden ocupado ({}), reintentando", msg);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            "🧾 Orden {} abierta para el vehículo {}",
            order.order_number(),
            order.vehicle_id()
        );

        Ok(ApiResponse::success_with_message(
            ServiceOrderResponse::from(&order),
            "Service order created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ServiceOrderResponse> {
        let order = self.load(id).await?;
        Ok(ServiceOrderResponse::from(&order))
    }

    pub async fn get_by_order_number(&self, order_number: &str) -> AppResult<ServiceOrderResponse> {
        if !OrderNumberGenerator::validate(order_number) {
            return Err(AppError::BadRequest(format!(
                "Order number '{}' must have the format YYYY-MM-NNNN",
                order_number
            )));
        }
        let order = self
            .orders
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service order {} not found", order_number)))?;
        Ok(ServiceOrderResponse::from(&order))
    }

    pub async fn list(
        &self,
        filters: ServiceOrderFilters,
    ) -> AppResult<PageResponse<ServiceOrderResponse>> {
        let (limit, offset) = page_bounds(filters.limit, filters.offset);
        let query = ServiceOrderQuery {
            status: filters.status,
            customer_id: filters.customer_id,
            limit,
            offset,
        };
        let orders = self.orders.list(&query).await?;
        Ok(PageResponse {
            items: orders.iter().map(ServiceOrderResponse::from).collect(),
            limit,
            offset,
        })
    }

    pub async fn change_status(
        &self,
        id: Uuid,
        request: ChangeStatusRequest,
    ) -> AppResult<ApiResponse<ServiceOrderResponse>> {
        let order = self
            .mutate(id, |order, clock| order.transition_to(request.status, clock))
            .await?;
        info!("🔄 Orden {} ahora en {}", order.order_number(), order.status());
        Ok(ApiResponse::success(ServiceOrderResponse::from(&order)))
    }

    pub async fn approve(&self, id: Uuid) -> AppResult<ApiResponse<ServiceOrderResponse>> {
        let order = self.load(id).await?;
        if !self.customers.customer_exists(order.customer_id()).await? {
            return Err(not_found_error("Customer", &order.customer_id().to_string()));
        }
        let order = self.save_with(order, |order, clock| order.approve(clock)).await?;
        info!("✅ Orden {} aprobada por el cliente", order.order_number());
        Ok(ApiResponse::success_with_message(
            ServiceOrderResponse::from(&order),
            "Service order approved".to_string(),
        ))
    }

    pub async fn add_service(
        &self,
        id: Uuid,
        request: ServiceItemRequest,
    ) -> AppResult<ApiResponse<ServiceOrderResponse>> {
        validator::Validate::validate(&request)?;
        let item = request.into_item()?;
        let order = self
            .mutate(id, move |order, clock| order.add_service(item, clock))
            .await?;
        Ok(ApiResponse::success(ServiceOrderResponse::from(&order)))
    }

    pub async fn remove_service(
        &self,
        id: Uuid,
        service_type_id: Uuid,
    ) -> AppResult<ApiResponse<ServiceOrderResponse>> {
        let order = self
            .mutate(id, |order, clock| order.remove_service(service_type_id, clock))
            .await?;
        Ok(ApiResponse::success(ServiceOrderResponse::from(&order)))
    }

    pub async fn add_part(
        &self,
        id: Uuid,
        request: PartItemRequest,
    ) -> AppResult<ApiResponse<ServiceOrderResponse>> {
        validator::Validate::validate(&request)?;
        let item = request.into_item()?;
        let order = self
            .mutate(id, move |order, clock| order.add_part(item, clock))
            .await?;
        Ok(ApiResponse::success(ServiceOrderResponse::from(&order)))
    }

    pub async fn remove_part(
        &self,
        id: Uuid,
        part_id: Uuid,
    ) -> AppResult<ApiResponse<ServiceOrderResponse>> {
        let order = self
            .mutate(id, |order, clock| {
                order.remove_part(part_id, clock);
                Ok(())
            })
            .await?;
        Ok(ApiResponse::success(ServiceOrderResponse::from(&order)))
    }

    async fn load(&self, id: Uuid) -> AppResult<ServiceOrder> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Service order", &id.to_string()))
    }

    async fn mutate<F>(&self, id: Uuid, apply: F) -> AppResult<ServiceOrder>
    where
        F: FnOnce(&mut ServiceOrder, &dyn Clock) -> Result<(), DomainError>,
    {
        let order = self.load(id).await?;
        self.save_with(order, apply).await
    }

    async fn save_with<F>(&self, mut order: ServiceOrder, apply: F) -> AppResult<ServiceOrder>
    where
        F: FnOnce(&mut ServiceOrder, &dyn Clock) -> Result<(), DomainError>,
    {
        let expected_updated_at = order.updated_at();
        apply(&mut order, self.clock.as_ref())?;
        self.orders.update(&order, expected_updated_at).await?;
        Ok(order)
    }
}
