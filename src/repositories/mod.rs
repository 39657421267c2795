//! Repositorios
//!
//! Acceso a PostgreSQL con `sqlx`. Los contratos que consultan los casos de
//! uso de órdenes de servicio (`ServiceOrderStore`, `CustomerLookup`,
//! `VehicleLookup`) son traits para poder sustituirlos en pruebas.

pub mod customer_repository;
pub mod part_repository;
pub mod service_order_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use customer_repository::{CustomerLookup, CustomerRepository};
pub use part_repository::PartRepository;
pub use service_order_repository::{PgServiceOrderRepository, ServiceOrderQuery, ServiceOrderStore};
pub use user_repository::UserRepository;
pub use vehicle_repository::{VehicleLookup, VehicleRepository};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn has_code(error: &sqlx::Error, code: &str) -> bool {
    match error {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(code),
        _ => false,
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    has_code(error, UNIQUE_VIOLATION)
}

pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    has_code(error, FOREIGN_KEY_VIOLATION)
}
