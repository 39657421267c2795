//! Modelos del sistema
//!
//! Entidades que mapean al schema PostgreSQL, el agregado de orden de
//! servicio y los objetos de valor del dominio.

pub mod clock;
pub mod customer;
pub mod document;
pub mod license_plate;
pub mod order_number;
pub mod part;
pub mod service_order;
pub mod user;
pub mod vehicle;

pub use clock::{Clock, FixedClock, SystemClock};
pub use document::{Document, DocumentKind};
pub use license_plate::LicensePlate;
pub use order_number::OrderNumberGenerator;
pub use service_order::{
    NewServiceOrder, PartItem, ServiceItem, ServiceOrder, ServiceOrderRecord, ServiceOrderStatus,
};
