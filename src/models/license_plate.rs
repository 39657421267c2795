//! Matrícula de vehículo
//!
//! Acepta el formato antiguo (`AAA9999`) y el formato Mercosul
//! (`AAA9A99`). El valor se guarda normalizado: sin separadores y en
//! mayúsculas.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::errors::DomainError;

const PLATE_LENGTH: usize = 7;

lazy_static! {
    static ref LEGACY_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9]{4}$").unwrap();
    static ref MERCOSUL_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9][A-Z][0-9]{2}$").unwrap();
}

/// Formato de la matrícula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateLayout {
    Legacy,
    Mercosul,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicensePlate(String);

impl LicensePlate {
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let normalized = Self::normalize(raw);
        if layout_of(&normalized).is_none() {
            return Err(DomainError::InvalidLicensePlate(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn is_valid(raw: &str) -> bool {
        layout_of(&Self::normalize(raw)).is_some()
    }

    pub fn normalize(raw: &str) -> String {
        raw.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn layout(&self) -> PlateLayout {
        // new() solo admite valores con formato reconocido
        layout_of(&self.0).unwrap_or(PlateLayout::Legacy)
    }

    /// `ABC-1234` / `ABC-1D23`
    pub fn formatted(&self) -> String {
        if self.0.len() == PLATE_LENGTH {
            format!("{}-{}", &self.0[..3], &self.0[3..])
        } else {
            self.0.clone()
        }
    }
}

fn layout_of(normalized: &str) -> Option<PlateLayout> {
    if normalized.len() != PLATE_LENGTH {
        return None;
    }
    if LEGACY_PLATE.is_match(normalized) {
        Some(PlateLayout::Legacy)
    } else if MERCOSUL_PLATE.is_match(normalized) {
        Some(PlateLayout::Mercosul)
    } else {
        None
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for LicensePlate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<LicensePlate> for String {
    fn from(plate: LicensePlate) -> Self {
        plate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_plate_is_valid() {
        let plate = LicensePlate::new("ABC1234").unwrap();
        assert_eq!(plate.layout(), PlateLayout::Legacy);
        assert_eq!(plate.formatted(), "ABC-1234");
    }

    #[test]
    fn test_mercosul_plate_is_valid() {
        let plate = LicensePlate::new("ABC1D23").unwrap();
        assert_eq!(plate.layout(), PlateLayout::Mercosul);
        assert_eq!(plate.formatted(), "ABC-1D23");
    }

    #[test]
    fn test_invalid_plates() {
        assert!(!LicensePlate::is_valid("A1C1234"));
        assert!(!LicensePlate::is_valid("ABC123"));
        assert!(!LicensePlate::is_valid("ABC12345"));
        assert!(!LicensePlate::is_valid("ABCD123"));
        assert!(matches!(
            LicensePlate::new("A1C1234"),
            Err(DomainError::InvalidLicensePlate(_))
        ));
    }

    #[test]
    fn test_normalization_strips_separators_and_uppercases() {
        let plate = LicensePlate::new("abc-1d23").unwrap();
        assert_eq!(plate.value(), "ABC1D23");
        assert_eq!(plate, LicensePlate::new("ABC 1D23").unwrap());
        assert_eq!(plate.to_string(), "ABC1D23");
    }

    #[test]
    fn test_serde_round_trip_keeps_normalized_value() {
        let plate: LicensePlate = serde_json::from_str("\"abc-1234\"").unwrap();
        assert_eq!(serde_json::to_string(&plate).unwrap(), "\"ABC1234\"");
        assert!(serde_json::from_str::<LicensePlate>("\"A1C1234\"").is_err());
    }
}
