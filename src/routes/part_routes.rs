use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::PartController;
use crate::dto::part_dto::{CreatePartRequest, PartFilters, PartResponse, StockMovementRequest};
use crate::dto::{ApiResponse, PageResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_part_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_part).get(list_parts))
        .route("/:id", get(get_part))
        .route("/:id/stock/add", post(add_stock))
        .route("/:id/stock/remove", post(remove_stock))
}

async fn create_part(
    State(state): State<AppState>,
    Json(request): Json<CreatePartRequest>,
) -> Result<Json<ApiResponse<PartResponse>>, AppError> {
    let controller = PartController::from_state(&state);
    Ok(Json(controller.create(request).await?))
}

async fn list_parts(
    State(state): State<AppState>,
    Query(filters): Query<PartFilters>,
) -> Result<Json<ApiResponse<PageResponse<PartResponse>>>, AppError> {
    let controller = PartController::from_state(&state);
    Ok(Json(ApiResponse::success(controller.list(filters).await?)))
}

async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PartResponse>>, AppError> {
    let controller = PartController::from_state(&state);
    Ok(Json(ApiResponse::success(controller.get_by_id(id).await?)))
}

async fn add_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StockMovementRequest>,
) -> Result<Json<ApiResponse<PartResponse>>, AppError> {
    let controller = PartController::from_state(&state);
    Ok(Json(controller.add_stock(id, request).await?))
}

async fn remove_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StockMovementRequest>,
) -> Result<Json<ApiResponse<PartResponse>>, AppError> {
    let controller = PartController::from_state(&state);
    Ok(Json(controller.remove_stock(id, request).await?))
}
