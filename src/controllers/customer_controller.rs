use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerFilters, CustomerResponse, UpdateCustomerRequest,
};
use crate::dto::{ApiResponse, PageResponse};
use crate::models::{customer::Customer, Clock, Document};
use crate::repositories::CustomerRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::page_bounds;

pub struct CustomerController {
    repository: CustomerRepository,
    clock: Arc<dyn Clock>,
}

impl CustomerController {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            repository: CustomerRepository::new(state.pool.clone()),
            clock: state.clock.clone(),
        }
    }

    pub async fn create(
        &self,
        request: CreateCustomerRequest,
    ) -> AppResult<ApiResponse<CustomerResponse>> {
        request.validate()?;
        let document = Document::parse(&request.document)?;

        let now = self.clock.now();
        let customer = Customer {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.map(|e| e.trim().to_lowercase()),
            phone: request.phone,
            document: document.value().to_string(),
            created_at: now,
            updated_at: now,
        };
        let customer = self.repository.create(&customer).await?;
        info!("👤 Cliente {} registrado ({})", customer.id, document.formatted());

        Ok(ApiResponse::success_with_message(
            CustomerResponse::from(customer),
            "Customer created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<CustomerResponse> {
        let customer = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id.to_string()))?;
        Ok(CustomerResponse::from(customer))
    }

    pub async fn list(&self, filters: CustomerFilters) -> AppResult<PageResponse<CustomerResponse>> {
        let (limit, offset) = page_bounds(filters.limit, filters.offset);
        let name = filters.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let customers = self.repository.list(name, limit, offset).await?;
        Ok(PageResponse {
            items: customers.into_iter().map(CustomerResponse::from).collect(),
            limit,
            offset,
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCustomerRequest,
    ) -> AppResult<ApiResponse<CustomerResponse>> {
        request.validate()?;
        let customer = self
            .repository
            .update(
                id,
                request.name.map(|n| n.trim().to_string()),
                request.email.map(|e| e.trim().to_lowercase()),
                request.phone,
                self.clock.now(),
            )
            .await?
            .ok_or_else(|| not_found_error("Customer", &id.to_string()))?;

        Ok(ApiResponse::success_with_message(
            CustomerResponse::from(customer),
            "Customer updated".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Customer", &id.to_string()));
        }
        info!("🗑️ Cliente {} eliminado", id);
        Ok(())
    }
}
