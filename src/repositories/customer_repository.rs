use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::customer::Customer;
use crate::repositories::{is_foreign_key_violation, is_unique_violation};
use crate::utils::errors::{conflict_error, AppError, AppResult};

/// Comprobación de existencia que consultan las órdenes de servicio
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    async fn customer_exists(&self, id: Uuid) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, customer: &Customer) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, name, email, phone, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.document)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                conflict_error("Customer", "document", &customer.document)
            } else {
                AppError::Database(e)
            }
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn list(&self, name: Option<&str>, limit: i64, offset: i64) -> AppResult<Vec<Customer>> {
        debug!("🔍 Listando clientes (name={:?}, limit={}, offset={})", name, limit, offset);
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(name)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    /// `false` si no existía
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict(
                        "Customer still has vehicles or service orders".to_string(),
                    )
                } else {
                    AppError::Database(e)
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CustomerLookup for CustomerRepository {
    async fn customer_exists(&self, id: Uuid) -> AppResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
