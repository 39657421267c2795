use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::ServiceOrderController;
use crate::dto::service_order_dto::{
    ChangeStatusRequest, CreateServiceOrderRequest, PartItemRequest, ServiceItemRequest,
    ServiceOrderFilters, ServiceOrderResponse,
};
use crate::dto::{ApiResponse, PageResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_service_order_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/number/:order_number", get(get_order_by_number))
        .route("/:id", get(get_order))
        .route("/:id/status", post(change_status))
        .route("/:id/approve", post(approve_order))
        .route("/:id/services", post(add_service))
        .route("/:id/services/:service_type_id", delete(remove_service))
        .route("/:id/parts", post(add_part))
        .route("/:id/parts/:part_id", delete(remove_part))
}

async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateServiceOrderRequest>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(controller.create(request).await?))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(filters): Query<ServiceOrderFilters>,
) -> Result<Json<ApiResponse<PageResponse<ServiceOrderResponse>>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(ApiResponse::success(controller.list(filters).await?)))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(ApiResponse::success(controller.get_by_id(id).await?)))
}

async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(ApiResponse::success(
        controller.get_by_order_number(&order_number).await?,
    )))
}

async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(controller.change_status(id, request).await?))
}

async fn approve_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(controller.approve(id).await?))
}

async fn add_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ServiceItemRequest>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(controller.add_service(id, request).await?))
}

async fn remove_service(
    State(state): State<AppState>,
    Path((id, service_type_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(controller.remove_service(id, service_type_id).await?))
}

async fn add_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PartItemRequest>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(controller.add_part(id, request).await?))
}

async fn remove_part(
    State(state): State<AppState>,
    Path((id, part_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<ServiceOrderResponse>>, AppError> {
    let controller = ServiceOrderController::from_state(&state);
    Ok(Json(controller.remove_part(id, part_id).await?))
}
