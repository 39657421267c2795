use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::CustomerController;
use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerFilters, CustomerResponse, UpdateCustomerRequest,
};
use crate::dto::{ApiResponse, PageResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_customer_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let controller = CustomerController::from_state(&state);
    Ok(Json(controller.create(request).await?))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(filters): Query<CustomerFilters>,
) -> Result<Json<ApiResponse<PageResponse<CustomerResponse>>>, AppError> {
    let controller = CustomerController::from_state(&state);
    Ok(Json(ApiResponse::success(controller.list(filters).await?)))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let controller = CustomerController::from_state(&state);
    Ok(Json(ApiResponse::success(controller.get_by_id(id).await?)))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let controller = CustomerController::from_state(&state);
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CustomerController::from_state(&state);
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message_only("Customer deleted".to_string())))
}
