//! Generador de números de orden `YYYY-MM-NNNN`

use chrono::{DateTime, Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::clock::Clock;

lazy_static! {
    static ref ORDER_NUMBER: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{4}$").unwrap();
}

pub struct OrderNumberGenerator;

impl OrderNumberGenerator {
    /// Último secuencial representable con cuatro dígitos
    pub const MAX_SEQUENCE: i64 = 9999;

    /// `true` si ya no queda número libre para el año
    pub fn sequence_exhausted(sequence_count_so_far: i64) -> bool {
        sequence_count_so_far >= Self::MAX_SEQUENCE
    }

    /// Genera el siguiente número para `year`.
    ///
    /// El mes siempre es el mes actual del reloj, aunque `year` sea otro
    /// año: los números ya emitidos dependen de este comportamiento.
    pub fn generate(year: i32, sequence_count_so_far: i64, clock: &dyn Clock) -> String {
        let month = clock.now().month();
        format!("{:04}-{:02}-{:04}", year, month, sequence_count_so_far + 1)
    }

    /// Año y mes tomados del mismo instante
    pub fn generate_at(now: DateTime<Utc>, sequence_count_so_far: i64) -> String {
        format!(
            "{:04}-{:02}-{:04}",
            now.year(),
            now.month(),
            sequence_count_so_far + 1
        )
    }

    pub fn validate(order_number: &str) -> bool {
        ORDER_NUMBER.is_match(order_number)
    }

    pub fn extract_year(order_number: &str) -> Option<i32> {
        Self::field(order_number, 0)
    }

    pub fn extract_month(order_number: &str) -> Option<u32> {
        Self::field(order_number, 1)
    }

    pub fn extract_sequence_number(order_number: &str) -> Option<u32> {
        Self::field(order_number, 2)
    }

    /// Prefijo `YYYY-` usado para contar las órdenes de un año
    pub fn year_prefix(year: i32) -> String {
        format!("{:04}-", year)
    }

    fn field<T: std::str::FromStr>(order_number: &str, index: usize) -> Option<T> {
        if !Self::validate(order_number) {
            return None;
        }
        order_number.split('-').nth(index)?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::clock::FixedClock;
    use chrono::TimeZone;

    fn october_clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 10, 15, 9, 30, 0).unwrap())
    }

    #[test]
    fn test_validate() {
        assert!(OrderNumberGenerator::validate("2024-10-0001"));
        assert!(!OrderNumberGenerator::validate("invalid"));
        assert!(!OrderNumberGenerator::validate("2024-10-001"));
        assert!(!OrderNumberGenerator::validate("2024-10-00011"));
        assert!(!OrderNumberGenerator::validate(" 2024-10-0001"));
    }

    #[test]
    fn test_generate_pads_sequence() {
        let clock = october_clock();
        let number = OrderNumberGenerator::generate(2024, 99, &clock);
        assert_eq!(number, "2024-10-0100");
        assert_eq!(OrderNumberGenerator::generate(2024, 0, &clock), "2024-10-0001");
    }

    #[test]
    fn test_last_sequence_of_the_year() {
        let now = Utc.with_ymd_and_hms(2024, 10, 15, 0, 0, 0).unwrap();
        let last = OrderNumberGenerator::generate_at(now, 9998);
        assert_eq!(last, "2024-10-9999");
        assert!(OrderNumberGenerator::validate(&last));
        assert!(!OrderNumberGenerator::sequence_exhausted(9998));
        assert!(OrderNumberGenerator::sequence_exhausted(9999));
    }

    #[test]
    fn test_generate_uses_clock_month_not_year() {
        let clock = october_clock();
        assert_eq!(OrderNumberGenerator::generate(2023, 4, &clock), "2023-10-0005");
    }

    #[test]
    fn test_generate_at_uses_same_instant() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(OrderNumberGenerator::generate_at(now, 41), "2025-01-0042");
    }

    #[test]
    fn test_extract_fields() {
        assert_eq!(OrderNumberGenerator::extract_year("2024-10-0100"), Some(2024));
        assert_eq!(OrderNumberGenerator::extract_month("2024-10-0100"), Some(10));
        assert_eq!(OrderNumberGenerator::extract_sequence_number("2024-10-0100"), Some(100));
    }

    #[test]
    fn test_extract_from_invalid_returns_none() {
        assert_eq!(OrderNumberGenerator::extract_year("invalid"), None);
        assert_eq!(OrderNumberGenerator::extract_month("2024/10/0001"), None);
        assert_eq!(OrderNumberGenerator::extract_sequence_number(""), None);
    }
}
