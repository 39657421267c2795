use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::Vehicle;
use crate::repositories::{is_foreign_key_violation, is_unique_violation};
use crate::utils::errors::{conflict_error, AppError, AppResult};

/// Pertenencia vehículo-cliente, consultada al abrir una orden
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    async fn vehicle_belongs_to(&self, vehicle_id: Uuid, customer_id: Uuid) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, customer_id, license_plate, brand, model, year, color, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.customer_id)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.color)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                conflict_error("Vehicle", "license_plate", &vehicle.license_plate)
            } else {
                AppError::Database(e)
            }
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    pub async fn list(
        &self,
        customer_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE ($1::uuid IS NULL OR customer_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn update(
        &self,
        id: Uuid,
        brand: Option<String>,
        model: Option<String>,
        year: Option<i32>,
        color: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET brand = COALESCE($2, brand),
                model = COALESCE($3, model),
                year = COALESCE($4, year),
                color = COALESCE($5, color),
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(brand)
        .bind(model)
        .bind(year)
        .bind(color)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict("Vehicle is referenced by service orders".to_string())
                } else {
                    AppError::Database(e)
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl VehicleLookup for VehicleRepository {
    async fn vehicle_belongs_to(&self, vehicle_id: Uuid, customer_id: Uuid) -> AppResult<bool> {
        let (belongs,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1 AND customer_id = $2)",
        )
        .bind(vehicle_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(belongs)
    }
}
