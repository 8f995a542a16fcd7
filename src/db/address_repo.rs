// src/db/address_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{map_write_error, repository::Repository},
    models::address::Address,
};

#[derive(Clone)]
pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Address> for PgAddressRepository {
    async fn insert(&self, record: &Address) -> Result<Address, AppError> {
        sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (id, owner_id, name, address1, address2, zip_code, city, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_id, name, address1, address2, zip_code, city, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.name)
        .bind(&record.address1)
        .bind(&record.address2)
        .bind(record.zip_code)
        .bind(&record.city)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, AppError> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, owner_id, name, address1, address2, zip_code, city, created_at
            FROM addresses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    async fn list(&self) -> Result<Vec<Address>, AppError> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, owner_id, name, address1, address2, zip_code, city, created_at
            FROM addresses
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(addresses)
    }

    async fn update(&self, record: &Address) -> Result<Option<Address>, AppError> {
        sqlx::query_as::<_, Address>(
            r#"
            UPDATE addresses
            SET name = $2, address1 = $3, address2 = $4, zip_code = $5, city = $6
            WHERE id = $1
            RETURNING id, owner_id, name, address1, address2, zip_code, city, created_at
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.address1)
        .bind(&record.address2)
        .bind(record.zip_code)
        .bind(&record.city)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
