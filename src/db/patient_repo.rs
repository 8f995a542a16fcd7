// src/db/patient_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{map_write_error, repository::Repository},
    models::patient::Patient,
};

#[derive(Clone)]
pub struct PgPatientRepository {
    pool: PgPool,
}

impl PgPatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Patient> for PgPatientRepository {
    async fn insert(&self, record: &Patient) -> Result<Patient, AppError> {
        sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (
                id, owner_id, firstname, lastname, phone_number,
                special, description, address_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, owner_id, firstname, lastname, phone_number,
                special, description, address_id, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.firstname)
        .bind(&record.lastname)
        .bind(&record.phone_number)
        .bind(record.special)
        .bind(&record.description)
        .bind(record.address_id)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            SELECT
                id, owner_id, firstname, lastname, phone_number,
                special, description, address_id, created_at
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn list(&self) -> Result<Vec<Patient>, AppError> {
        let patients = sqlx::query_as::<_, Patient>(
            r#"
            SELECT
                id, owner_id, firstname, lastname, phone_number,
                special, description, address_id, created_at
            FROM patients
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(patients)
    }

    async fn update(&self, record: &Patient) -> Result<Option<Patient>, AppError> {
        sqlx::query_as::<_, Patient>(
            r#"
            UPDATE patients
            SET firstname = $2, lastname = $3, phone_number = $4,
                special = $5, description = $6, address_id = $7
            WHERE id = $1
            RETURNING
                id, owner_id, firstname, lastname, phone_number,
                special, description, address_id, created_at
            "#,
        )
        .bind(record.id)
        .bind(&record.firstname)
        .bind(&record.lastname)
        .bind(&record.phone_number)
        .bind(record.special)
        .bind(&record.description)
        .bind(record.address_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM patients WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
