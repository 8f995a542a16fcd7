// src/db/master_run_repo.rs

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{map_write_error, repository::Repository},
    models::run::MasterRun,
};

// Motoristas e pacientes vêm das tabelas-ponte como arrays
const SELECT_MASTER_RUNS: &str = r#"
    SELECT
        m.id, m.owner_id, m.comments, m.date, m.am, m.pm, m.vehicle_id,
        ARRAY(
            SELECT d.user_id FROM master_run_drivers d
            WHERE d.master_run_id = m.id ORDER BY d.position
        ) AS drivers,
        ARRAY(
            SELECT p.patient_id FROM master_run_patients p
            WHERE p.master_run_id = m.id ORDER BY p.position
        ) AS patients,
        m.created_at
    FROM master_runs m
"#;

#[derive(Clone)]
pub struct PgMasterRunRepository {
    pool: PgPool,
}

impl PgMasterRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reescreve as tabelas-ponte (motoristas e pacientes) da tournée.
    async fn write_links(conn: &mut PgConnection, record: &MasterRun) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM master_run_drivers WHERE master_run_id = $1")
            .bind(record.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO master_run_drivers (master_run_id, user_id, position)
            SELECT $1, d.user_id, d.position
            FROM UNNEST($2::uuid[]) WITH ORDINALITY AS d(user_id, position)
            "#,
        )
        .bind(record.id)
        .bind(&record.drivers)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM master_run_patients WHERE master_run_id = $1")
            .bind(record.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO master_run_patients (master_run_id, patient_id, position)
            SELECT $1, p.patient_id, p.position
            FROM UNNEST($2::uuid[]) WITH ORDINALITY AS p(patient_id, position)
            "#,
        )
        .bind(record.id)
        .bind(&record.patients)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<MasterRun>, AppError> {
        let sql = format!("{} WHERE m.id = $1", SELECT_MASTER_RUNS);
        let master_run = sqlx::query_as::<_, MasterRun>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(master_run)
    }
}

#[async_trait]
impl Repository<MasterRun> for PgMasterRunRepository {
    async fn insert(&self, record: &MasterRun) -> Result<MasterRun, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO master_runs (id, owner_id, comments, date, am, pm, vehicle_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.comments)
        .bind(record.date)
        .bind(record.am)
        .bind(record.pm)
        .bind(record.vehicle_id)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        Self::write_links(&mut *tx, record)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        self.fetch(record.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("tournée {} sumiu após o insert", record.id).into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MasterRun>, AppError> {
        self.fetch(id).await
    }

    async fn list(&self) -> Result<Vec<MasterRun>, AppError> {
        let sql = format!("{} ORDER BY m.created_at ASC", SELECT_MASTER_RUNS);
        let master_runs = sqlx::query_as::<_, MasterRun>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(master_runs)
    }

    async fn update(&self, record: &MasterRun) -> Result<Option<MasterRun>, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE master_runs
            SET comments = $2, date = $3, am = $4, pm = $5, vehicle_id = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.comments)
        .bind(record.date)
        .bind(record.am)
        .bind(record.pm)
        .bind(record.vehicle_id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        // Nada para atualizar: o rollback acontece no drop do tx
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::write_links(&mut *tx, record)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;

        self.fetch(record.id).await
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        // As tabelas-ponte e as corridas caem via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM master_runs WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
