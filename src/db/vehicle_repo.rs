// src/db/vehicle_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{map_write_error, repository::Repository},
    models::vehicle::Vehicle,
};

#[derive(Clone)]
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Vehicle> for PgVehicleRepository {
    async fn insert(&self, record: &Vehicle) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, owner_id, kind, license_plate, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, kind, license_plate, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(record.kind)
        .bind(&record.license_plate)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT id, owner_id, kind, license_plate, created_at FROM vehicles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vehicle)
    }

    async fn list(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT id, owner_id, kind, license_plate, created_at FROM vehicles ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    async fn update(&self, record: &Vehicle) -> Result<Option<Vehicle>, AppError> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET kind = $2, license_plate = $3
            WHERE id = $1
            RETURNING id, owner_id, kind, license_plate, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.kind)
        .bind(&record.license_plate)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
