// src/db/recipe_repo.rs

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{map_write_error, repository::Repository},
    models::recipe::{Ingredient, Recipe, Tag},
};

// =========================================================================
//  TAGS
// =========================================================================

#[derive(Clone)]
pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Tag> for PgTagRepository {
    async fn insert(&self, record: &Tag) -> Result<Tag, AppError> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, owner_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.name)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, owner_id, name, created_at FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn list(&self) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, owner_id, name, created_at FROM tags ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn update(&self, record: &Tag) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<_, Tag>(
            "UPDATE tags SET name = $2 WHERE id = $1 RETURNING id, owner_id, name, created_at",
        )
        .bind(record.id)
        .bind(&record.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tag)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =========================================================================
//  INGREDIENTES
// =========================================================================

#[derive(Clone)]
pub struct PgIngredientRepository {
    pool: PgPool,
}

impl PgIngredientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Ingredient> for PgIngredientRepository {
    async fn insert(&self, record: &Ingredient) -> Result<Ingredient, AppError> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (id, owner_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, created_at
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.name)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ingredient>, AppError> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, owner_id, name, created_at FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ingredient)
    }

    async fn list(&self) -> Result<Vec<Ingredient>, AppError> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT id, owner_id, name, created_at FROM ingredients ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ingredients)
    }

    async fn update(&self, record: &Ingredient) -> Result<Option<Ingredient>, AppError> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "UPDATE ingredients SET name = $2 WHERE id = $1 RETURNING id, owner_id, name, created_at",
        )
        .bind(record.id)
        .bind(&record.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ingredient)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =========================================================================
//  RECEITAS (com as tabelas-ponte de tags e ingredientes)
// =========================================================================

const SELECT_RECIPES: &str = r#"
    SELECT
        r.id, r.owner_id, r.title, r.time_minutes, r.price, r.link,
        ARRAY(
            SELECT t.tag_id FROM recipe_tags t
            WHERE t.recipe_id = r.id ORDER BY t.position
        ) AS tags,
        ARRAY(
            SELECT i.ingredient_id FROM recipe_ingredients i
            WHERE i.recipe_id = r.id ORDER BY i.position
        ) AS ingredients,
        r.image, r.created_at
    FROM recipes r
"#;

#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write_links(conn: &mut PgConnection, record: &Recipe) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(record.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id, position)
            SELECT $1, t.tag_id, t.position
            FROM UNNEST($2::uuid[]) WITH ORDINALITY AS t(tag_id, position)
            "#,
        )
        .bind(record.id)
        .bind(&record.tags)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(record.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, position)
            SELECT $1, i.ingredient_id, i.position
            FROM UNNEST($2::uuid[]) WITH ORDINALITY AS i(ingredient_id, position)
            "#,
        )
        .bind(record.id)
        .bind(&record.ingredients)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Recipe>, AppError> {
        let sql = format!("{} WHERE r.id = $1", SELECT_RECIPES);
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recipe)
    }
}

#[async_trait]
impl Repository<Recipe> for PgRecipeRepository {
    async fn insert(&self, record: &Recipe) -> Result<Recipe, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO recipes (id, owner_id, title, time_minutes, price, link, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.title)
        .bind(record.time_minutes)
        .bind(record.price)
        .bind(&record.link)
        .bind(&record.image)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        Self::write_links(&mut *tx, record)
            .await
            .map_err(map_write_error)?;

        tx.commit().await?;

        self.fetch(record.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("receita {} sumiu após o insert", record.id).into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, AppError> {
        self.fetch(id).await
    }

    async fn list(&self) -> Result<Vec<Recipe>, AppError> {
        let sql = format!("{} ORDER BY r.created_at ASC", SELECT_RECIPES);
        let recipes = sqlx::query_as::<_, Recipe>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    async fn update(&self, record: &Recipe) -> Result<Option<Recipe>, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET title = $2, time_minutes = $3, price = $4, link = $5, image = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(record.time_minutes)
        .bind(record.price)
        .bind(&record.link)
        .bind(&record.image)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

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
        let result = sqlx::query("DELETE FROM recipes WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
