//! Modelo de ServiceOrder
//!
//! Agregado de la orden de servicio del taller: máquina de estados del
//! ciclo de vida, líneas de servicios y repuestos, totales derivados e
//! hitos temporales. Los campos son privados; solo se modifican a través
//! de las operaciones de este módulo para que los totales nunca queden
//! desalineados con las líneas.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::clock::Clock;
use crate::models::order_number::OrderNumberGenerator;
use crate::utils::errors::DomainError;

/// Estado de la orden - mapea al ENUM service_order_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "service_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceOrderStatus {
    Received,
    InDiagnosis,
    AwaitingApproval,
    InExecution,
    Finished,
    Delivered,
}

impl ServiceOrderStatus {
    pub const ALL: [ServiceOrderStatus; 6] = [
        ServiceOrderStatus::Received,
        ServiceOrderStatus::InDiagnosis,
        ServiceOrderStatus::AwaitingApproval,
        ServiceOrderStatus::InExecution,
        ServiceOrderStatus::Finished,
        ServiceOrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceOrderStatus::Received => "RECEIVED",
            ServiceOrderStatus::InDiagnosis => "IN_DIAGNOSIS",
            ServiceOrderStatus::AwaitingApproval => "AWAITING_APPROVAL",
            ServiceOrderStatus::InExecution => "IN_EXECUTION",
            ServiceOrderStatus::Finished => "FINISHED",
            ServiceOrderStatus::Delivered => "DELIVERED",
        }
    }

    /// Estados alcanzables directamente desde este
    pub fn allowed_transitions(&self) -> &'static [ServiceOrderStatus] {
        use ServiceOrderStatus::*;
        match self {
            Received => &[InDiagnosis],
            InDiagnosis => &[AwaitingApproval, InExecution],
            AwaitingApproval => &[InExecution, InDiagnosis],
            InExecution => &[Finished],
            Finished => &[Delivered],
            Delivered => &[],
        }
    }

    pub fn can_transition_to(&self, next: ServiceOrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for ServiceOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceOrderStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("Unknown service order status '{}'", value))
    }
}

/// Horas estimadas máximas de una línea de servicio
pub const MAX_SERVICE_HOURS: u32 = 10_000;

/// Fecha prevista de conclusión: `now` más las horas estimadas
fn estimate_completion(hours: Decimal, now: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
    hours
        .checked_mul(Decimal::from(3600))
        .and_then(|seconds| seconds.round().to_i64())
        .and_then(Duration::try_seconds)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| {
            DomainError::InvalidLineItem(format!(
                "estimated time of {} hours cannot be scheduled",
                hours
            ))
        })
}

/// Línea de servicio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub service_type_id: Uuid,
    pub service_type_name: String,
    pub estimated_time_hours: Decimal,
    pub price: Decimal,
}

impl ServiceItem {
    pub fn new(
        service_type_id: Uuid,
        service_type_name: impl Into<String>,
        estimated_time_hours: Decimal,
        price: Decimal,
    ) -> Result<Self, DomainError> {
        let item = Self {
            service_type_id,
            service_type_name: service_type_name.into(),
            estimated_time_hours,
            price,
        };
        item.check()?;
        Ok(item)
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.price < Decimal::ZERO {
            return Err(DomainError::InvalidLineItem(format!(
                "service '{}' has a negative price",
                self.service_type_name
            )));
        }
        if self.estimated_time_hours < Decimal::ZERO {
            return Err(DomainError::InvalidLineItem(format!(
                "service '{}' has negative estimated hours",
                self.service_type_name
            )));
        }
        if self.estimated_time_hours > Decimal::from(MAX_SERVICE_HOURS) {
            return Err(DomainError::InvalidLineItem(format!(
                "service '{}' exceeds {} estimated hours",
                self.service_type_name, MAX_SERVICE_HOURS
            )));
        }
        Ok(())
    }
}

/// Línea de repuesto. `total_price` siempre es `quantity × unit_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartItem {
    pub part_id: Uuid,
    pub part_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl PartItem {
    pub fn new(
        part_id: Uuid,
        part_name: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<Self, DomainError> {
        let item = Self {
            part_id,
            part_name: part_name.into(),
            quantity,
            unit_price,
            total_price: Decimal::from(quantity) * unit_price,
        };
        item.check()?;
        Ok(item)
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.quantity <= 0 {
            return Err(DomainError::InvalidLineItem(format!(
                "part '{}' must have a positive quantity",
                self.part_name
            )));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::InvalidLineItem(format!(
                "part '{}' has a negative unit price",
                self.part_name
            )));
        }
        Ok(())
    }
}

/// Datos de entrada para abrir una orden
#[derive(Debug, Clone)]
pub struct NewServiceOrder {
    pub order_number: Option<String>,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub description: String,
    pub services: Vec<ServiceItem>,
    pub parts: Vec<PartItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOrder {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    vehicle_id: Uuid,
    status: ServiceOrderStatus,
    description: String,
    services: Vec<ServiceItem>,
    parts: Vec<PartItem>,
    total_service_price: Decimal,
    total_parts_price: Decimal,
    total_price: Decimal,
    estimated_time_hours: Decimal,
    estimated_completion_date: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceOrder {
    pub fn create(input: NewServiceOrder, clock: &dyn Clock) -> Result<Self, DomainError> {
        let now = clock.now();

        let order_number = match input.order_number {
            Some(number) if OrderNumberGenerator::validate(&number) => number,
            Some(number) => return Err(DomainError::InvalidOrderNumber(number)),
            None => OrderNumberGenerator::generate_at(now, 0),
        };

        for service in &input.services {
            service.check()?;
        }

        let mut parts: Vec<PartItem> = Vec::with_capacity(input.parts.len());
        for part in input.parts {
            merge_part(&mut parts, part)?;
        }

        let mut order = Self {
            id: Uuid::new_v4(),
            order_number,
            customer_id: input.customer_id,
            vehicle_id: input.vehicle_id,
            status: ServiceOrderStatus::Received,
            description: input.description,
            services: input.services,
            parts,
            total_service_price: Decimal::ZERO,
            total_parts_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
            estimated_time_hours: Decimal::ZERO,
            estimated_completion_date: None,
            started_at: None,
            completed_at: None,
            delivered_at: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        order.recalculate_totals();
        order.estimated_completion_date =
            Some(estimate_completion(order.estimated_time_hours, now)?);
        Ok(order)
    }

    // ---- Ciclo de vida ----

    pub fn transition_to(
        &mut self,
        next: ServiceOrderStatus,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        let now = clock.now();
        match next {
            ServiceOrderStatus::InExecution => self.started_at = Some(now),
            ServiceOrderStatus::Finished => self.completed_at = Some(now),
            ServiceOrderStatus::Delivered => self.delivered_at = Some(now),
            ServiceOrderStatus::AwaitingApproval => self.approved_at = None,
            ServiceOrderStatus::Received | ServiceOrderStatus::InDiagnosis => {}
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Aprobación del cliente: registra `approved_at` y pasa a ejecución
    pub fn approve(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.status != ServiceOrderStatus::AwaitingApproval {
            return Err(DomainError::OperationNotAllowed(format!(
                "order {} can only be approved while {}, current status is {}",
                self.order_number,
                ServiceOrderStatus::AwaitingApproval,
                self.status
            )));
        }
        self.approved_at = Some(clock.now());
        self.transition_to(ServiceOrderStatus::InExecution, clock)
    }

    // ---- Líneas ----

    pub fn add_service(&mut self, item: ServiceItem, clock: &dyn Clock) -> Result<(), DomainError> {
        item.check()?;
        let now = clock.now();
        let estimate = estimate_completion(self.estimated_time_hours + item.estimated_time_hours, now)?;
        self.services.push(item);
        self.recalculate_totals();
        self.estimated_completion_date = Some(estimate);
        self.updated_at = now;
        Ok(())
    }

    /// Elimina todas las líneas con ese tipo de servicio
    pub fn remove_service(
        &mut self,
        service_type_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let now = clock.now();
        let remaining: Decimal = self
            .services
            .iter()
            .filter(|s| s.service_type_id != service_type_id)
            .map(|s| s.estimated_time_hours)
            .sum();
        let estimate = estimate_completion(remaining, now)?;
        self.services.retain(|s| s.service_type_id != service_type_id);
        self.recalculate_totals();
        self.estimated_completion_date = Some(estimate);
        self.updated_at = now;
        Ok(())
    }

    /// Si el repuesto ya está en la orden se suma la cantidad
    pub fn add_part(&mut self, part: PartItem, clock: &dyn Clock) -> Result<(), DomainError> {
        merge_part(&mut self.parts, part)?;
        self.recalculate_totals();
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn remove_part(&mut self, part_id: Uuid, clock: &dyn Clock) {
        self.parts.retain(|p| p.part_id != part_id);
        self.recalculate_totals();
        self.updated_at = clock.now();
    }

    /// Recalcula los totales a partir de las líneas actuales.
    /// No toca `updated_at`; llamarlo dos veces seguidas no cambia nada.
    pub fn recalculate_totals(&mut self) {
        self.total_service_price = self.services.iter().map(|s| s.price).sum();
        self.total_parts_price = self.parts.iter().map(|p| p.total_price).sum();
        self.total_price = self.total_service_price + self.total_parts_price;
        self.estimated_time_hours = self.services.iter().map(|s| s.estimated_time_hours).sum();
    }

    // ---- Lectura ----

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn vehicle_id(&self) -> Uuid {
        self.vehicle_id
    }

    pub fn status(&self) -> ServiceOrderStatus {
        self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn services(&self) -> &[ServiceItem] {
        &self.services
    }

    pub fn parts(&self) -> &[PartItem] {
        &self.parts
    }

    pub fn total_service_price(&self) -> Decimal {
        self.total_service_price
    }

    pub fn total_parts_price(&self) -> Decimal {
        self.total_parts_price
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn estimated_time_hours(&self) -> Decimal {
        self.estimated_time_hours
    }

    pub fn estimated_completion_date(&self) -> Option<DateTime<Utc>> {
        self.estimated_completion_date
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn to_record(&self) -> ServiceOrderRecord {
        ServiceOrderRecord {
            id: self.id,
            order_number: self.order_number.clone(),
            customer_id: self.customer_id,
            vehicle_id: self.vehicle_id,
            status: self.status,
            description: self.description.clone(),
            services: Json(self.services.clone()),
            parts: Json(self.parts.clone()),
            total_service_price: self.total_service_price,
            total_parts_price: self.total_parts_price,
            total_price: self.total_price,
            estimated_time_hours: self.estimated_time_hours,
            estimated_completion_date: self.estimated_completion_date,
            started_at: self.started_at,
            completed_at: self.completed_at,
            delivered_at: self.delivered_at,
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn merge_part(parts: &mut Vec<PartItem>, incoming: PartItem) -> Result<(), DomainError> {
    incoming.check()?;
    match parts.iter_mut().find(|p| p.part_id == incoming.part_id) {
        Some(existing) => {
            let quantity = existing.quantity.checked_add(incoming.quantity).ok_or_else(|| {
                DomainError::InvalidLineItem(format!(
                    "quantity overflow for part '{}'",
                    existing.part_name
                ))
            })?;
            existing.quantity = quantity;
            existing.total_price = Decimal::from(quantity) * existing.unit_price;
        }
        None => {
            let mut part = incoming;
            part.total_price = Decimal::from(part.quantity) * part.unit_price;
            parts.push(part);
        }
    }
    Ok(())
}

/// Fila de la tabla service_orders. Los totales se guardan y se
/// recuperan tal cual, sin recalcular.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceOrderRecord {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub status: ServiceOrderStatus,
    pub description: String,
    pub services: Json<Vec<ServiceItem>>,
    pub parts: Json<Vec<PartItem>>,
    pub total_service_price: Decimal,
    pub total_parts_price: Decimal,
    pub total_price: Decimal,
    pub estimated_time_hours: Decimal,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceOrderRecord> for ServiceOrder {
    fn from(record: ServiceOrderRecord) -> Self {
        Self {
            id: record.id,
            order_number: record.order_number,
            customer_id: record.customer_id,
            vehicle_id: record.vehicle_id,
            status: record.status,
            description: record.description,
            services: record.services.0,
            parts: record.parts.0,
            total_service_price: record.total_service_price,
            total_parts_price: record.total_parts_price,
            total_price: record.total_price,
            estimated_time_hours: record.estimated_time_hours,
            estimated_completion_date: record.estimated_completion_date,
            started_at: record.started_at,
            completed_at: record.completed_at,
            delivered_at: record.delivered_at,
            approved_at: record.approved_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::clock::FixedClock;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 10, 15, 8, 0, 0).unwrap())
    }

    fn oil_change() -> ServiceItem {
        ServiceItem::new(Uuid::new_v4(), "Troca de óleo", dec("1.5"), dec("120.00")).unwrap()
    }

    fn alignment() -> ServiceItem {
        ServiceItem::new(Uuid::new_v4(), "Alinhamento", dec("0.75"), dec("89.90")).unwrap()
    }

    fn filter(part_id: Uuid, quantity: i32) -> PartItem {
        PartItem::new(part_id, "Filtro de óleo", quantity, dec("35.50")).unwrap()
    }

    fn new_order(clock: &FixedClock) -> ServiceOrder {
        ServiceOrder::create(
            NewServiceOrder {
                order_number: Some("2024-10-0001".to_string()),
                customer_id: Uuid::new_v4(),
                vehicle_id: Uuid::new_v4(),
                description: "Barulho na suspensão".to_string(),
                services: vec![],
                parts: vec![],
            },
            clock,
        )
        .unwrap()
    }

    fn order_in(status: ServiceOrderStatus, clock: &FixedClock) -> ServiceOrder {
        use ServiceOrderStatus::*;
        let mut order = new_order(clock);
        let path: &[ServiceOrderStatus] = match status {
            Received => &[],
            InDiagnosis => &[InDiagnosis],
            AwaitingApproval => &[InDiagnosis, AwaitingApproval],
            InExecution => &[InDiagnosis, InExecution],
            Finished => &[InDiagnosis, InExecution, Finished],
            Delivered => &[InDiagnosis, InExecution, Finished, Delivered],
        };
        for step in path {
            order.transition_to(*step, clock).unwrap();
        }
        order
    }

    fn assert_totals_consistent(order: &ServiceOrder) {
        let services: Decimal = order.services().iter().map(|s| s.price).sum();
        let hours: Decimal = order.services().iter().map(|s| s.estimated_time_hours).sum();
        let parts: Decimal = order.parts().iter().map(|p| p.total_price).sum();
        assert_eq!(order.total_service_price(), services);
        assert_eq!(order.estimated_time_hours(), hours);
        assert_eq!(order.total_parts_price(), parts);
        assert_eq!(order.total_price(), order.total_service_price() + order.total_parts_price());
    }

    #[test]
    fn test_create_defaults() {
        let clock = clock();
        let order = new_order(&clock);
        assert_eq!(order.status(), ServiceOrderStatus::Received);
        assert_eq!(order.order_number(), "2024-10-0001");
        assert_eq!(order.total_price(), Decimal::ZERO);
        assert!(order.started_at().is_none());
        assert!(order.completed_at().is_none());
        assert!(order.delivered_at().is_none());
        assert!(order.approved_at().is_none());
        assert_eq!(order.created_at(), clock.now());
        assert_eq!(order.estimated_completion_date(), Some(clock.now()));
    }

    #[test]
    fn test_create_computes_totals_from_initial_items() {
        let clock = clock();
        let part_id = Uuid::new_v4();
        let order = ServiceOrder::create(
            NewServiceOrder {
                order_number: None,
                customer_id: Uuid::new_v4(),
                vehicle_id: Uuid::new_v4(),
                description: "Revisão".to_string(),
                services: vec![oil_change(), alignment()],
                parts: vec![filter(part_id, 1), filter(part_id, 2)],
            },
            &clock,
        )
        .unwrap();

        assert_eq!(order.order_number(), "2024-10-0001");
        assert_eq!(order.total_service_price(), dec("209.90"));
        assert_eq!(order.parts().len(), 1);
        assert_eq!(order.parts()[0].quantity, 3);
        assert_eq!(order.total_parts_price(), dec("106.50"));
        assert_eq!(order.total_price(), dec("316.40"));
        assert_eq!(order.estimated_time_hours(), dec("2.25"));
        assert_eq!(
            order.estimated_completion_date(),
            Some(clock.now() + Duration::minutes(135))
        );
    }

    #[test]
    fn test_create_rejects_malformed_order_number() {
        let clock = clock();
        let result = ServiceOrder::create(
            NewServiceOrder {
                order_number: Some("OS-1".to_string()),
                customer_id: Uuid::new_v4(),
                vehicle_id: Uuid::new_v4(),
                description: String::new(),
                services: vec![],
                parts: vec![],
            },
            &clock,
        );
        assert!(matches!(result, Err(DomainError::InvalidOrderNumber(_))));
    }

    #[test]
    fn test_from_received_only_diagnosis_is_allowed() {
        let clock = clock();
        for target in ServiceOrderStatus::ALL {
            let mut order = order_in(ServiceOrderStatus::Received, &clock);
            let result = order.transition_to(target, &clock);
            if target == ServiceOrderStatus::InDiagnosis {
                assert!(result.is_ok());
                assert_eq!(order.status(), ServiceOrderStatus::InDiagnosis);
            } else {
                assert_eq!(
                    result,
                    Err(DomainError::InvalidTransition {
                        from: ServiceOrderStatus::Received,
                        to: target,
                    })
                );
                assert_eq!(order.status(), ServiceOrderStatus::Received);
            }
        }
    }

    #[test]
    fn test_delivered_is_terminal() {
        let clock = clock();
        for target in ServiceOrderStatus::ALL {
            let mut order = order_in(ServiceOrderStatus::Delivered, &clock);
            let before = order.clone();
            assert!(order.transition_to(target, &clock).is_err());
            assert_eq!(order, before);
        }
        assert!(ServiceOrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_transition_table_matches_every_pair() {
        use ServiceOrderStatus::*;
        let allowed = [
            (Received, InDiagnosis),
            (InDiagnosis, AwaitingApproval),
            (InDiagnosis, InExecution),
            (AwaitingApproval, InExecution),
            (AwaitingApproval, InDiagnosis),
            (InExecution, Finished),
            (Finished, Delivered),
        ];
        let clock = clock();
        for from in ServiceOrderStatus::ALL {
            for to in ServiceOrderStatus::ALL {
                let mut order = order_in(from, &clock);
                let expected = allowed.contains(&(from, to));
                assert_eq!(order.transition_to(to, &clock).is_ok(), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_milestones_are_set_on_entry() {
        let clock = clock();
        let mut order = order_in(ServiceOrderStatus::InDiagnosis, &clock);

        clock.advance(Duration::hours(1));
        order.transition_to(ServiceOrderStatus::InExecution, &clock).unwrap();
        assert_eq!(order.started_at(), Some(clock.now()));

        clock.advance(Duration::hours(3));
        order.transition_to(ServiceOrderStatus::Finished, &clock).unwrap();
        assert_eq!(order.completed_at(), Some(clock.now()));

        clock.advance(Duration::days(1));
        order.transition_to(ServiceOrderStatus::Delivered, &clock).unwrap();
        assert_eq!(order.delivered_at(), Some(clock.now()));
        assert_eq!(order.updated_at(), clock.now());
    }

    #[test]
    fn test_started_at_reflects_last_entry_into_execution() {
        let clock = clock();
        let mut order = order_in(ServiceOrderStatus::AwaitingApproval, &clock);
        order.transition_to(ServiceOrderStatus::InDiagnosis, &clock).unwrap();
        order.transition_to(ServiceOrderStatus::AwaitingApproval, &clock).unwrap();
        order.transition_to(ServiceOrderStatus::InDiagnosis, &clock).unwrap();
        assert!(order.started_at().is_none());

        clock.advance(Duration::minutes(30));
        order.transition_to(ServiceOrderStatus::InExecution, &clock).unwrap();
        assert_eq!(order.started_at(), Some(clock.now()));
    }

    #[test]
    fn test_approve_from_awaiting_approval() {
        let clock = clock();
        let mut order = order_in(ServiceOrderStatus::AwaitingApproval, &clock);
        clock.advance(Duration::hours(2));

        order.approve(&clock).unwrap();
        assert_eq!(order.status(), ServiceOrderStatus::InExecution);
        assert_eq!(order.approved_at(), Some(clock.now()));
        assert_eq!(order.started_at(), Some(clock.now()));
    }

    #[test]
    fn test_approve_from_other_status_fails_without_changes() {
        let clock = clock();
        for status in ServiceOrderStatus::ALL {
            if status == ServiceOrderStatus::AwaitingApproval {
                continue;
            }
            let mut order = order_in(status, &clock);
            let before = order.clone();
            assert!(matches!(
                order.approve(&clock),
                Err(DomainError::OperationNotAllowed(_))
            ));
            assert_eq!(order, before);
        }
    }

    #[test]
    fn test_returning_to_awaiting_approval_clears_approval() {
        let clock = clock();
        let order = order_in(ServiceOrderStatus::InDiagnosis, &clock);
        let mut record = order.to_record();
        record.approved_at = Some(clock.now() - Duration::days(1));
        let mut order = ServiceOrder::from(record);

        order.transition_to(ServiceOrderStatus::AwaitingApproval, &clock).unwrap();
        assert!(order.approved_at().is_none());
    }

    #[test]
    fn test_service_sequences_keep_totals_exact() {
        let clock = clock();
        let mut order = new_order(&clock);
        let oil = oil_change();
        let oil_id = oil.service_type_id;

        order.add_service(oil.clone(), &clock).unwrap();
        assert_totals_consistent(&order);
        order.add_service(alignment(), &clock).unwrap();
        order.add_service(oil, &clock).unwrap();
        assert_totals_consistent(&order);
        assert_eq!(order.total_service_price(), dec("329.90"));
        assert_eq!(order.estimated_time_hours(), dec("3.75"));

        order.remove_service(oil_id, &clock).unwrap();
        assert_eq!(order.services().len(), 1);
        assert_totals_consistent(&order);
        assert_eq!(order.total_service_price(), dec("89.90"));
        assert_eq!(order.estimated_time_hours(), dec("0.75"));
    }

    #[test]
    fn test_estimate_is_a_snapshot_taken_when_services_change() {
        let clock = clock();
        let mut order = new_order(&clock);
        order.add_service(oil_change(), &clock).unwrap();
        let estimate = order.estimated_completion_date();
        assert_eq!(estimate, Some(clock.now() + Duration::minutes(90)));

        clock.advance(Duration::hours(5));
        assert_eq!(order.estimated_completion_date(), estimate);

        order.add_part(filter(Uuid::new_v4(), 1), &clock).unwrap();
        assert_eq!(order.estimated_completion_date(), estimate);

        order.add_service(alignment(), &clock).unwrap();
        assert_eq!(
            order.estimated_completion_date(),
            Some(clock.now() + Duration::minutes(135))
        );
    }

    #[test]
    fn test_adding_same_part_merges_quantity() {
        let clock = clock();
        let mut order = new_order(&clock);
        let part_id = Uuid::new_v4();

        order.add_part(filter(part_id, 2), &clock).unwrap();
        order.add_part(filter(part_id, 3), &clock).unwrap();

        assert_eq!(order.parts().len(), 1);
        assert_eq!(order.parts()[0].quantity, 5);
        assert_eq!(order.parts()[0].total_price, dec("177.50"));
        assert_totals_consistent(&order);
    }

    #[test]
    fn test_remove_part_removes_every_match() {
        let clock = clock();
        let mut order = new_order(&clock);
        let kept = Uuid::new_v4();
        let removed = Uuid::new_v4();
        order.add_part(filter(kept, 1), &clock).unwrap();
        order.add_part(filter(removed, 4), &clock).unwrap();

        order.remove_part(removed, &clock);
        assert_eq!(order.parts().len(), 1);
        assert_eq!(order.parts()[0].part_id, kept);
        assert_eq!(order.total_parts_price(), dec("35.50"));
        assert_totals_consistent(&order);
    }

    #[test]
    fn test_invalid_line_items_are_rejected_without_changes() {
        let clock = clock();
        let mut order = new_order(&clock);
        order.add_part(filter(Uuid::new_v4(), 1), &clock).unwrap();
        let before = order.clone();

        let negative_quantity = PartItem {
            part_id: Uuid::new_v4(),
            part_name: "Pastilha".to_string(),
            quantity: -2,
            unit_price: dec("10"),
            total_price: dec("-20"),
        };
        assert!(matches!(
            order.add_part(negative_quantity, &clock),
            Err(DomainError::InvalidLineItem(_))
        ));

        let negative_price = ServiceItem {
            service_type_id: Uuid::new_v4(),
            service_type_name: "Desconto".to_string(),
            estimated_time_hours: dec("0"),
            price: dec("-50"),
        };
        assert!(order.add_service(negative_price, &clock).is_err());
        assert_eq!(order, before);

        assert!(PartItem::new(Uuid::new_v4(), "x", 0, dec("1")).is_err());
        assert!(ServiceItem::new(Uuid::new_v4(), "x", dec("-1"), dec("1")).is_err());
    }

    #[test]
    fn test_oversized_estimate_is_rejected_without_changes() {
        let clock = clock();
        let mut order = new_order(&clock);
        order.add_service(oil_change(), &clock).unwrap();
        let before = order.clone();

        let endless = ServiceItem {
            service_type_id: Uuid::new_v4(),
            service_type_name: "Restauração".to_string(),
            estimated_time_hours: dec("1000000000000000"),
            price: dec("10"),
        };
        assert!(matches!(
            order.add_service(endless, &clock),
            Err(DomainError::InvalidLineItem(_))
        ));
        assert_eq!(order, before);
        assert!(ServiceItem::new(Uuid::new_v4(), "x", dec("10000.5"), dec("1")).is_err());
        assert!(ServiceItem::new(Uuid::new_v4(), "x", dec("10000"), dec("1")).is_ok());
    }

    #[test]
    fn test_estimate_beyond_calendar_is_rejected() {
        let clock = FixedClock::new(DateTime::<Utc>::MAX_UTC - Duration::days(30));
        let mut order = new_order(&clock);
        let before = order.clone();

        let long_job = ServiceItem::new(Uuid::new_v4(), "Retífica", dec("9000"), dec("10")).unwrap();
        assert!(matches!(
            order.add_service(long_job, &clock),
            Err(DomainError::InvalidLineItem(_))
        ));
        assert_eq!(order, before);
        assert_eq!(order.estimated_completion_date(), Some(clock.now()));
    }

    #[test]
    fn test_line_item_changes_bump_updated_at() {
        let clock = clock();
        let mut order = new_order(&clock);
        let service = oil_change();
        let service_id = service.service_type_id;

        clock.advance(Duration::minutes(1));
        order.add_service(service, &clock).unwrap();
        assert_eq!(order.updated_at(), clock.now());

        clock.advance(Duration::minutes(1));
        order.remove_service(service_id, &clock).unwrap();
        assert_eq!(order.updated_at(), clock.now());
        assert!(order.created_at() < order.updated_at());
    }

    #[test]
    fn test_recalculate_totals_is_idempotent() {
        let clock = clock();
        let mut order = new_order(&clock);
        order.add_service(oil_change(), &clock).unwrap();
        order.add_part(filter(Uuid::new_v4(), 7), &clock).unwrap();

        order.recalculate_totals();
        let first = order.clone();
        order.recalculate_totals();
        assert_eq!(order, first);
    }

    #[test]
    fn test_record_round_trip_keeps_stored_totals() {
        let clock = clock();
        let mut order = new_order(&clock);
        order.add_service(oil_change(), &clock).unwrap();
        order.transition_to(ServiceOrderStatus::InDiagnosis, &clock).unwrap();

        let restored = ServiceOrder::from(order.to_record());
        assert_eq!(restored, order);
    }

    #[test]
    fn test_status_parsing_and_display() {
        assert_eq!(
            ServiceOrderStatus::from_str("awaiting_approval"),
            Ok(ServiceOrderStatus::AwaitingApproval)
        );
        assert!(ServiceOrderStatus::from_str("CANCELLED").is_err());
        assert_eq!(ServiceOrderStatus::InExecution.to_string(), "IN_EXECUTION");
        assert_eq!(
            serde_json::to_string(&ServiceOrderStatus::InDiagnosis).unwrap(),
            "\"IN_DIAGNOSIS\""
        );
    }
}
