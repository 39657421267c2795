//! DTOs de la API
//!
//! Estructuras de request/response que viajan por HTTP.

pub mod api_response;
pub mod auth_dto;
pub mod customer_dto;
pub mod part_dto;
pub mod service_order_dto;
pub mod vehicle_dto;

pub use api_response::{ApiResponse, PageResponse};
