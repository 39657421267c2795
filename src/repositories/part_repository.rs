use sqlx::PgPool;
use uuid::Uuid;

use crate::models::part::Part;
use crate::repositories::is_unique_violation;
use crate::utils::errors::{conflict_error, AppError, AppResult};

#[derive(Clone)]
pub struct PartRepository {
    pool: PgPool,
}

impl PartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, part: &Part) -> AppResult<Part> {
        sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (id, code, name, unit_price, stock_quantity, minimum_stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(part.id)
        .bind(&part.code)
        .bind(&part.name)
        .bind(part.unit_price)
        .bind(part.stock_quantity)
        .bind(part.minimum_stock)
        .bind(part.created_at)
        .bind(part.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                conflict_error("Part", "code", &part.code)
            } else {
                AppError::Database(e)
            }
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Part>> {
        let part = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(part)
    }

    pub async fn list(&self, below_minimum: bool, limit: i64, offset: i64) -> AppResult<Vec<Part>> {
        let parts = sqlx::query_as::<_, Part>(
            r#"
            SELECT * FROM parts
            WHERE (NOT $1 OR stock_quantity < minimum_stock)
            ORDER BY code ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(below_minimum)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(parts)
    }

    /// Guarda el stock si nadie lo modificó desde `expected_updated_at`
    pub async fn save_stock(
        &self,
        part: &Part,
        expected_updated_at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE parts
            SET stock_quantity = $3, updated_at = $4
            WHERE id = $1 AND updated_at = $2
            "#,
        )
        .bind(part.id)
        .bind(expected_updated_at)
        .bind(part.stock_quantity)
        .bind(part.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Part '{}' was modified concurrently, reload and retry",
                part.code
            )));
        }
        Ok(())
    }
}
