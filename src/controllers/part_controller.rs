use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::part_dto::{CreatePartRequest, PartFilters, PartResponse, StockMovementRequest};
use crate::dto::{ApiResponse, PageResponse};
use crate::models::{part::Part, Clock};
use crate::repositories::PartRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult, DomainError};
use crate::utils::validation::page_bounds;

pub struct PartController {
    repository: PartRepository,
    clock: Arc<dyn Clock>,
}

impl PartController {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            repository: PartRepository::new(state.pool.clone()),
            clock: state.clock.clone(),
        }
    }

    pub async fn create(&self, request: CreatePartRequest) -> AppResult<ApiResponse<PartResponse>> {
        request.validate()?;
        let part = Part::new(
            request.code.trim().to_uppercase(),
            request.name.trim().to_string(),
            request.unit_price,
            request.stock_quantity,
            request.minimum_stock,
            self.clock.as_ref(),
        )?;
        let part = self.repository.create(&part).await?;
        info!("🔩 Repuesto {} dado de alta", part.code);

        Ok(ApiResponse::success_with_message(
            PartResponse::from(part),
            "Part created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<PartResponse> {
        Ok(PartResponse::from(self.load(id).await?))
    }

    pub async fn list(&self, filters: PartFilters) -> AppResult<PageResponse<PartResponse>> {
        let (limit, offset) = page_bounds(filters.limit, filters.offset);
        let parts = self
            .repository
            .list(filters.below_minimum.unwrap_or(false), limit, offset)
            .await?;
        Ok(PageResponse {
            items: parts.into_iter().map(PartResponse::from).collect(),
            limit,
            offset,
        })
    }

    pub async fn add_stock(
        &self,
        id: Uuid,
        request: StockMovementRequest,
    ) -> AppResult<ApiResponse<PartResponse>> {
        request.validate()?;
        let part = self
            .move_stock(id, |part, clock| part.add_stock(request.quantity, clock))
            .await?;
        Ok(ApiResponse::success(PartResponse::from(part)))
    }

    pub async fn remove_stock(
        &self,
        id: Uuid,
        request: StockMovementRequest,
    ) -> AppResult<ApiResponse<PartResponse>> {
        request.validate()?;
        let part = self
            .move_stock(id, |part, clock| part.remove_stock(request.quantity, clock))
            .await?;
        if part.is_below_minimum() {
            warn!(
                "📉 Repuesto {} por debajo del mínimo ({} < {})",
                part.code, part.stock_quantity, part.minimum_stock
            );
        }
        Ok(ApiResponse::success(PartResponse::from(part)))
    }

    async fn load(&self, id: Uuid) -> AppResult<Part> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Part", &id.to_string()))
    }

    async fn move_stock<F>(&self, id: Uuid, apply: F) -> AppResult<Part>
    where
        F: FnOnce(&mut Part, &dyn Clock) -> Result<(), DomainError>,
    {
        let mut part = self.load(id).await?;
        let expected_updated_at = part.updated_at;
        apply(&mut part, self.clock.as_ref())?;
        self.repository.save_stock(&part, expected_updated_at).await?;
        Ok(part)
    }
}
