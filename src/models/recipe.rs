// src/models/recipe.rs

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{common::error::AppError, db::Record, models::required};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tag {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner_id: Uuid,
    #[schema(example = "Vegan")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ingredient {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner_id: Uuid,
    #[schema(example = "Kale")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Recipe {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner_id: Uuid,

    #[schema(example = "Chocolate cheesecake")]
    pub title: String,

    #[schema(example = 30)]
    pub time_minutes: i32,

    #[schema(example = "5.00")]
    pub price: Decimal,

    pub link: String,

    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,

    // Caminho relativo ao MEDIA_ROOT
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl Record for Tag {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Record for Ingredient {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Record for Recipe {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Gera o caminho de uma nova imagem: `uploads/recipe/<uuid>.<ext>`.
pub fn recipe_image_file_path(filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin");
    format!("uploads/recipe/{}.{}", Uuid::new_v4(), ext)
}

// Tag e Ingredient têm o mesmo formulário
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct NamePayload {
    #[validate(
        required(message = "O nome é obrigatório."),
        length(min = 1, max = 255, message = "O nome deve ter entre 1 e 255 caracteres.")
    )]
    pub name: Option<String>,
}

impl NamePayload {
    pub fn merged_onto(self, current_name: &str) -> Self {
        Self {
            name: self.name.or_else(|| Some(current_name.to_string())),
        }
    }

    pub fn into_tag(self, id: Uuid, owner_id: Uuid, created_at: DateTime<Utc>) -> Result<Tag, AppError> {
        Ok(Tag {
            id,
            owner_id,
            name: required(self.name, "name")?,
            created_at,
        })
    }

    pub fn into_ingredient(
        self,
        id: Uuid,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Ingredient, AppError> {
        Ok(Ingredient {
            id,
            owner_id,
            name: required(self.name, "name")?,
            created_at,
        })
    }
}

// max_digits=5, decimal_places=2
fn stored_price(price: Decimal) -> Decimal {
    price.round_dp(2)
}

// Recebe o valor já arredondado: 999.995 vira 1000.00 e tem de falhar
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() || *price >= Decimal::new(100_000, 2) {
        let mut err = ValidationError::new("range");
        err.message = Some("O preço deve estar entre 0 e 999.99.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RecipePayload {
    #[validate(
        required(message = "O título é obrigatório."),
        length(min = 1, max = 255, message = "O título deve ter entre 1 e 255 caracteres.")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "O tempo de preparo é obrigatório."),
        range(min = 0, message = "O tempo não pode ser negativo.")
    )]
    pub time_minutes: Option<i32>,

    #[validate(required(message = "O preço é obrigatório."))]
    pub price: Option<Decimal>,

    #[validate(length(max = 255, message = "O link deve ter no máximo 255 caracteres."))]
    pub link: Option<String>,

    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

impl RecipePayload {
    /// Regras que o derive não cobre (faixa do preço).
    pub fn validate_consistency(&self) -> Result<(), AppError> {
        if let Some(price) = &self.price {
            validate_price(&stored_price(*price)).map_err(|e| {
                let mut errors = validator::ValidationErrors::new();
                errors.add("price", e);
                AppError::ValidationError(errors)
            })?;
        }
        Ok(())
    }

    pub fn merged_onto(self, current: &Recipe) -> Self {
        Self {
            title: self.title.or_else(|| Some(current.title.clone())),
            time_minutes: self.time_minutes.or(Some(current.time_minutes)),
            price: self.price.or(Some(current.price)),
            link: self.link.or_else(|| Some(current.link.clone())),
            tags: self.tags.or_else(|| Some(current.tags.clone())),
            ingredients: self.ingredients.or_else(|| Some(current.ingredients.clone())),
        }
    }

    pub fn into_record(
        self,
        id: Uuid,
        owner_id: Uuid,
        image: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Recipe, AppError> {
        Ok(Recipe {
            id,
            owner_id,
            title: required(self.title, "title")?,
            time_minutes: required(self.time_minutes, "time_minutes")?,
            price: stored_price(required(self.price, "price")?),
            link: self.link.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
            image,
            created_at,
        })
    }
}
