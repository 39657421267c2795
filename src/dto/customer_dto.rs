use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{customer::Customer, Document, DocumentKind};
use crate::utils::validation::{validate_document, validate_not_blank, validate_phone};

// Request para crear un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 2, max = 150), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20), custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(custom = "validate_document")]
    pub document: String,
}

// Request para actualizar un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 2, max = 150), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20), custom = "validate_phone")]
    pub phone: Option<String>,
}

// Filtros del listado
#[derive(Debug, Default, Deserialize)]
pub struct CustomerFilters {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// Response de cliente
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub document: String,
    pub document_formatted: String,
    pub document_kind: Option<DocumentKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        // Lo guardado siempre pasó por Document; si no, se expone tal cual
        let parsed = Document::parse(&customer.document).ok();
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            document_formatted: parsed
                .as_ref()
                .map(Document::formatted)
                .unwrap_or_else(|| customer.document.clone()),
            document_kind: parsed.as_ref().map(Document::kind),
            document: customer.document,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}
