use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{OrderNumberGenerator, ServiceOrder, ServiceOrderRecord, ServiceOrderStatus};
use crate::repositories::is_unique_violation;
use crate::utils::errors::{conflict_error, AppError, AppResult};

const SERVICE_ORDER_COLUMNS: &str = r#"
    id, order_number, customer_id, vehicle_id, status, description, services, parts,
    total_service_price, total_parts_price, total_price, estimated_time_hours,
    estimated_completion_date, started_at, completed_at, delivered_at, approved_at,
    created_at, updated_at
"#;

/// Filtros del listado de órdenes
#[derive(Debug, Clone, Default)]
pub struct ServiceOrderQuery {
    pub status: Option<ServiceOrderStatus>,
    pub customer_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

/// Almacén de órdenes de servicio.
///
/// `update` solo escribe si la fila sigue teniendo `expected_updated_at`;
/// de lo contrario devuelve `AppError::Conflict`.
#[async_trait]
pub trait ServiceOrderStore: Send + Sync {
    async fn insert(&self, order: &ServiceOrder) -> AppResult<()>;
    async fn update(&self, order: &ServiceOrder, expected_updated_at: DateTime<Utc>) -> AppResult<()>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ServiceOrder>>;
    async fn find_by_order_number(&self, order_number: &str) -> AppResult<Option<ServiceOrder>>;
    async fn list(&self, query: &ServiceOrderQuery) -> AppResult<Vec<ServiceOrder>>;
    /// Órdenes cuyo número empieza por `YYYY-`
    async fn count_by_year(&self, year: i32) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PgServiceOrderRepository {
    pool: PgPool,
}

impl PgServiceOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceOrderStore for PgServiceOrderRepository {
    async fn insert(&self, order: &ServiceOrder) -> AppResult<()> {
        let record = order.to_record();
        sqlx::query(
            r#"
            INSERT INTO service_orders (
                id, order_number, customer_id, vehicle_id, status, description, services, parts,
                total_service_price, total_parts_price, total_price, estimated_time_hours,
                estimated_completion_date, started_at, completed_at, delivered_at, approved_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(record.id)
        .bind(&record.order_number)
        .bind(record.customer_id)
        .bind(record.vehicle_id)
        .bind(record.status)
        .bind(&record.description)
        .bind(&record.services)
        .bind(&record.parts)
        .bind(record.total_service_price)
        .bind(record.total_parts_price)
        .bind(record.total_price)
        .bind(record.estimated_time_hours)
        .bind(record.estimated_completion_date)
        .bind(record.started_at)
        .bind(record.completed_at)
        .bind(record.delivered_at)
        .bind(record.approved_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                conflict_error("Service order", "order_number", &record.order_number)
            } else {
                AppError::Database(e)
            }
        })?;

        debug!("💾 Orden {} insertada", record.order_number);
        Ok(())
    }

    async fn update(&self, order: &ServiceOrder, expected_updated_at: DateTime<Utc>) -> AppResult<()> {
        let record = order.to_record();
        let result = sqlx::query(
            r#"
            UPDATE service_orders
            SET status = $3,
                description = $4,
                services = $5,
                parts = $6,
                total_service_price = $7,
                total_parts_price = $8,
                total_price = $9,
                estimated_time_hours = $10,
                estimated_completion_date = $11,
                started_at = $12,
                completed_at = $13,
                delivered_at = $14,
                approved_at = $15,
                updated_at = $16
            WHERE id = $1 AND updated_at = $2
            "#,
        )
        .bind(record.id)
        .bind(expected_updated_at)
        .bind(record.status)
        .bind(&record.description)
        .bind(&record.services)
        .bind(&record.parts)
        .bind(record.total_service_price)
        .bind(record.total_parts_price)
        .bind(record.total_price)
        .bind(record.estimated_time_hours)
        .bind(record.estimated_completion_date)
        .bind(record.started_at)
        .bind(record.completed_at)
        .bind(record.delivered_at)
        .bind(record.approved_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("⚠️ Escritura concurrente detectada en la orden {}", record.order_number);
            return Err(AppError::Conflict(format!(
                "Service order {} was modified concurrently, reload and retry",
                record.order_number
            )));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ServiceOrder>> {
        let sql = format!("SELECT {} FROM service_orders WHERE id = $1", SERVICE_ORDER_COLUMNS);
        let record = sqlx::query_as::<_, ServiceOrderRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record.map(ServiceOrder::from))
    }

    async fn find_by_order_number(&self, order_number: &str) -> AppResult<Option<ServiceOrder>> {
        let sql = format!(
            "SELECT {} FROM service_orders WHERE order_number = $1",
            SERVICE_ORDER_COLUMNS
        );
        let record = sqlx::query_as::<_, ServiceOrderRecord>(&sql)
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record.map(ServiceOrder::from))
    }

    async fn list(&self, query: &ServiceOrderQuery) -> AppResult<Vec<ServiceOrder>> {
        let sql = format!(
            r#"
            SELECT {} FROM service_orders
            WHERE ($1::service_order_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            SERVICE_ORDER_COLUMNS
        );
        let records = sqlx::query_as::<_, ServiceOrderRecord>(&sql)
            .bind(query.status)
            .bind(query.customer_id)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records.into_iter().map(ServiceOrder::from).collect())
    }

    async fn count_by_year(&self, year: i32) -> AppResult<i64> {
        let pattern = format!("{}%", OrderNumberGenerator::year_prefix(year));
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM service_orders WHERE order_number LIKE $1")
                .bind(pattern)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
