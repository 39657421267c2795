//! Modelo de Part (inventario de repuestos)
//!
//! A diferencia de las líneas de repuesto de una orden, el inventario
//! protege el stock: nunca acepta cantidades no positivas ni deja el stock
//! por debajo de cero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::clock::Clock;
use crate::utils::errors::DomainError;

/// Part principal - mapea exactamente a la tabla parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Part {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub unit_price: Decimal,
    pub stock_quantity: i32,
    pub minimum_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    pub fn new(
        code: String,
        name: String,
        unit_price: Decimal,
        stock_quantity: i32,
        minimum_stock: i32,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        if unit_price < Decimal::ZERO {
            return Err(DomainError::InvalidLineItem(format!(
                "part '{}' has a negative unit price",
                code
            )));
        }
        if stock_quantity < 0 || minimum_stock < 0 {
            return Err(DomainError::InvalidLineItem(format!(
                "part '{}' cannot start with negative stock",
                code
            )));
        }
        let now = clock.now();
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            name,
            unit_price,
            stock_quantity,
            minimum_stock,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn add_stock(&mut self, quantity: i32, clock: &dyn Clock) -> Result<(), DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidLineItem(
                "stock quantity to add must be positive".to_string(),
            ));
        }
        self.stock_quantity = self.stock_quantity.checked_add(quantity).ok_or_else(|| {
            DomainError::InvalidLineItem(format!("stock overflow for part '{}'", self.code))
        })?;
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn remove_stock(&mut self, quantity: i32, clock: &dyn Clock) -> Result<(), DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidLineItem(
                "stock quantity to remove must be positive".to_string(),
            ));
        }
        if quantity > self.stock_quantity {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        self.stock_quantity -= quantity;
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn is_below_minimum(&self) -> bool {
        self.stock_quantity < self.minimum_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::clock::FixedClock;
    use chrono::{Duration, TimeZone};

    fn brake_pad(clock: &FixedClock) -> Part {
        Part::new(
            "PF-001".to_string(),
            "Pastilha de freio".to_string(),
            Decimal::new(8990, 2),
            10,
            4,
            clock,
        )
        .unwrap()
    }

    #[test]
    fn test_stock_movements() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let mut part = brake_pad(&clock);

        clock.advance(Duration::minutes(5));
        part.remove_stock(7, &clock).unwrap();
        assert_eq!(part.stock_quantity, 3);
        assert!(part.is_below_minimum());
        assert_eq!(part.updated_at, clock.now());

        part.add_stock(5, &clock).unwrap();
        assert_eq!(part.stock_quantity, 8);
        assert!(!part.is_below_minimum());
    }

    #[test]
    fn test_stock_guards_leave_part_unchanged() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let mut part = brake_pad(&clock);
        let before = part.clone();

        assert_eq!(
            part.remove_stock(11, &clock),
            Err(DomainError::InsufficientStock {
                requested: 11,
                available: 10
            })
        );
        assert!(part.remove_stock(0, &clock).is_err());
        assert!(part.add_stock(-3, &clock).is_err());
        assert_eq!(part, before);
    }

    #[test]
    fn test_new_rejects_negative_values() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert!(Part::new("X".into(), "X".into(), Decimal::new(-1, 0), 1, 0, &clock).is_err());
        assert!(Part::new("X".into(), "X".into(), Decimal::ONE, -1, 0, &clock).is_err());
    }
}
