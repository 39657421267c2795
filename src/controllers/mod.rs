//! Controladores
//!
//! Casos de uso de la API: validan la entrada, aplican las reglas del
//! dominio y delegan la persistencia en los repositorios.

pub mod auth_controller;
pub mod customer_controller;
pub mod part_controller;
pub mod service_order_controller;
pub mod vehicle_controller;

pub use auth_controller::AuthController;
pub use customer_controller::CustomerController;
pub use part_controller::PartController;
pub use service_order_controller::ServiceOrderController;
pub use vehicle_controller::VehicleController;
