// src/db/run_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        map_write_error,
        repository::{Repository, RunRepository},
    },
    models::run::Run,
};

#[derive(Clone)]
pub struct PgRunRepository {
    pool: PgPool,
}

impl PgRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Run> for PgRunRepository {
    async fn insert(&self, record: &Run) -> Result<Run, AppError> {
        sqlx::query_as::<_, Run>(
            r#"
            INSERT INTO runs (
                id, owner_id, date, departure_time, arriving_time,
                pick_up_location_id, deposit_location_id, is_return_path, comments,
                master_run_id, patient_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING
                id, owner_id, date, departure_time, arriving_time,
                pick_up_location_id, deposit_location_id, is_return_path, comments,
                master_run_id, patient_id, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(record.date)
        .bind(record.departure_time)
        .bind(record.arriving_time)
        .bind(record.pick_up_location_id)
        .bind(record.deposit_location_id)
        .bind(record.is_return_path)
        .bind(&record.comments)
        .bind(record.master_run_id)
        .bind(record.patient_id)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Run>, AppError> {
        let run = sqlx::query_as::<_, Run>(
            r#"
            SELECT
                id, owner_id, date, departure_time, arriving_time,
                pick_up_location_id, deposit_location_id, is_return_path, comments,
                master_run_id, patient_id, created_at
            FROM runs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(run)
    }

    async fn list(&self) -> Result<Vec<Run>, AppError> {
        let runs = sqlx::query_as::<_, Run>(
            r#"
            SELECT
                id, owner_id, date, departure_time, arriving_time,
                pick_up_location_id, deposit_location_id, is_return_path, comments,
                master_run_id, patient_id, created_at
            FROM runs
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(runs)
    }

    async fn update(&self, record: &Run) -> Result<Option<Run>, AppError> {
        sqlx::query_as::<_, Run>(
            r#"
            UPDATE runs
            SET date = $2, departure_time = $3, arriving_time = $4,
                pick_up_location_id = $5, deposit_location_id = $6,
                is_return_path = $7, comments = $8, master_run_id = $9, patient_id = $10
            WHERE id = $1
            RETURNING
                id, owner_id, date, departure_time, arriving_time,
                pick_up_location_id, deposit_location_id, is_return_path, comments,
                master_run_id, patient_id, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.date)
        .bind(record.departure_time)
        .bind(record.arriving_time)
        .bind(record.pick_up_location_id)
        .bind(record.deposit_location_id)
        .bind(record.is_return_path)
        .bind(&record.comments)
        .bind(record.master_run_id)
        .bind(record.patient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM runs WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RunRepository for PgRunRepository {
    async fn list_by_master_runs(&self, master_run_ids: &[Uuid]) -> Result<Vec<Run>, AppError> {
        let runs = sqlx::query_as::<_, Run>(
            r#"
            SELECT
                id, owner_id, date, departure_time, arriving_time,
                pick_up_location_id, deposit_location_id, is_return_path, comments,
                master_run_id, patient_id, created_at
            FROM runs
            WHERE master_run_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(master_run_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(runs)
    }
}
