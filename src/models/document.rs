//! Documento fiscal (CPF / CNPJ)
//!
//! Objeto de valor inmutable que envuelve el número normalizado (solo
//! dígitos). Construirlo garantiza que los dígitos verificadores son
//! correctos para su tipo.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::errors::DomainError;

const CPF_LENGTH: usize = 11;
const CNPJ_LENGTH: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Tipo de documento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Persona física, 11 dígitos
    Cpf,
    /// Persona jurídica, 14 dígitos
    Cnpj,
}

impl DocumentKind {
    pub fn expected_length(&self) -> usize {
        match self {
            DocumentKind::Cpf => CPF_LENGTH,
            DocumentKind::Cnpj => CNPJ_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Document(String);

impl Document {
    /// Construye un documento del tipo declarado
    pub fn new(raw: &str, kind: DocumentKind) -> Result<Self, DomainError> {
        let digits = Self::normalize(raw);
        if digits.len() != kind.expected_length() || !checksum_matches(&digits, kind) {
            return Err(DomainError::InvalidDocument(raw.to_string()));
        }
        Ok(Self(digits))
    }

    /// Construye un documento infiriendo el tipo por la longitud
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let digits = Self::normalize(raw);
        let kind = match digits.len() {
            CPF_LENGTH => DocumentKind::Cpf,
            CNPJ_LENGTH => DocumentKind::Cnpj,
            _ => return Err(DomainError::InvalidDocument(raw.to_string())),
        };
        Self::new(&digits, kind)
    }

    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> DocumentKind {
        if self.0.len() == CPF_LENGTH {
            DocumentKind::Cpf
        } else {
            DocumentKind::Cnpj
        }
    }

    /// `XXX.XXX.XXX-XX` o `XX.XXX.XXX/XXXX-XX`
    pub fn formatted(&self) -> String {
        let d = &self.0;
        match self.kind() {
            DocumentKind::Cpf => format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]),
            DocumentKind::Cnpj => format!(
                "{}.{}.{}/{}-{}",
                &d[0..2],
                &d[2..5],
                &d[5..8],
                &d[8..12],
                &d[12..14]
            ),
        }
    }
}

fn to_digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}

fn checksum_matches(value: &str, kind: DocumentKind) -> bool {
    let digits = to_digits(value);
    if digits.len() != kind.expected_length() || all_equal(&digits) {
        return false;
    }
    match kind {
        DocumentKind::Cpf => cpf_checksum_matches(&digits),
        DocumentKind::Cnpj => cnpj_checksum_matches(&digits),
    }
}

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let digit = 11 - (sum % 11);
    if digit >= 10 {
        0
    } else {
        digit
    }
}

fn cpf_checksum_matches(digits: &[u32]) -> bool {
    cpf_check_digit(&digits[..9]) == digits[9] && cpf_check_digit(&digits[..10]) == digits[10]
}

fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

fn cnpj_checksum_matches(digits: &[u32]) -> bool {
    cnpj_check_digit(&digits[..12], &CNPJ_FIRST_WEIGHTS) == digits[12]
        && cnpj_check_digit(&digits[..13], &CNPJ_SECOND_WEIGHTS) == digits[13]
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Document {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Document> for String {
    fn from(document: Document) -> Self {
        document.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpf_normalizes_and_validates() {
        let document = Document::parse("529.982.247-25").unwrap();
        assert_eq!(document.value(), "52998224725");
        assert_eq!(document.kind(), DocumentKind::Cpf);
        assert_eq!(document.formatted(), "529.982.247-25");
    }

    #[test]
    fn test_cpf_with_corrupted_check_digit_is_invalid() {
        assert!(!Document::is_valid("52998224735"));
        assert!(matches!(
            Document::parse("52998224735"),
            Err(DomainError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_known_cpfs() {
        assert!(Document::is_valid("111.444.777-35"));
        assert!(Document::is_valid("000.000.001-91"));
        // resto 1 en el primer dígito: 11 - 1 = 10 se convierte en 0
        assert!(Document::is_valid("000.000.006-04"));
        assert!(!Document::is_valid("000.000.006-14"));
    }

    #[test]
    fn test_cnpj_normalizes_and_validates() {
        let document = Document::parse("11.222.333/0001-81").unwrap();
        assert_eq!(document.value(), "11222333000181");
        assert_eq!(document.kind(), DocumentKind::Cnpj);
        assert_eq!(document.formatted(), "11.222.333/0001-81");
        assert!(!Document::is_valid("11222333000191"));
    }

    #[test]
    fn test_repeated_digits_are_rejected() {
        assert!(!Document::is_valid("111.111.111-11"));
        assert!(!Document::is_valid("00000000000000"));
    }

    #[test]
    fn test_declared_kind_must_match_length() {
        assert!(Document::new("52998224725", DocumentKind::Cpf).is_ok());
        assert!(Document::new("52998224725", DocumentKind::Cnpj).is_err());
        assert!(Document::new("11222333000181", DocumentKind::Cpf).is_err());
        assert!(Document::parse("1234").is_err());
    }

    #[test]
    fn test_equality_is_by_normalized_value() {
        let formatted = Document::parse("529.982.247-25").unwrap();
        let raw = Document::parse("52998224725").unwrap();
        assert_eq!(formatted, raw);
        assert_eq!(formatted.to_string(), "52998224725");
    }

    #[test]
    fn test_serde_uses_normalized_string() {
        let document: Document = serde_json::from_str("\"529.982.247-25\"").unwrap();
        assert_eq!(serde_json::to_string(&document).unwrap(), "\"52998224725\"");
        assert!(serde_json::from_str::<Document>("\"52998224735\"").is_err());
    }
}
