// src/models/address.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, db::Record, models::required};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Address {
    pub id: Uuid,

    // Dono do registro (quem criou). Somente leitura na API.
    #[serde(rename = "user")]
    pub owner_id: Uuid,

    #[schema(example = "Domicile patient")]
    pub name: String,

    #[schema(example = "1 rue de la fontaine")]
    pub address1: String,

    #[schema(example = "Bâtiment B")]
    pub address2: String,

    #[schema(example = 33000)]
    pub zip_code: i32,

    #[schema(example = "Bordeaux")]
    pub city: String,

    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Address {
    // "Bordeaux, 1 rue de la fontaine Bâtiment B, 33000"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.address1)?;
        if !self.address2.is_empty() {
            write!(f, " {}", self.address2)?;
        }
        write!(f, ", {}", self.zip_code)
    }
}

impl Record for Address {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

// Serve para POST, PUT e PATCH. No PATCH os campos ausentes vêm do registro atual.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AddressPayload {
    #[validate(
        required(message = "O nome é obrigatório."),
        length(min = 1, max = 255, message = "O nome deve ter entre 1 e 255 caracteres.")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "O endereço é obrigatório."),
        length(min = 1, max = 255, message = "O endereço deve ter entre 1 e 255 caracteres.")
    )]
    pub address1: Option<String>,

    #[validate(length(max = 255, message = "O complemento deve ter no máximo 255 caracteres."))]
    pub address2: Option<String>,

    #[validate(
        required(message = "O CEP é obrigatório."),
        range(min = 0, message = "O CEP não pode ser negativo.")
    )]
    pub zip_code: Option<i32>,

    #[validate(
        required(message = "A cidade é obrigatória."),
        length(min = 1, max = 255, message = "A cidade deve ter entre 1 e 255 caracteres.")
    )]
    pub city: Option<String>,
}

impl AddressPayload {
    pub fn merged_onto(self, current: &Address) -> Self {
        Self {
            name: self.name.or_else(|| Some(current.name.clone())),
            address1: self.address1.or_else(|| Some(current.address1.clone())),
            address2: self.address2.or_else(|| Some(current.address2.clone())),
            zip_code: self.zip_code.or(Some(current.zip_code)),
            city: self.city.or_else(|| Some(current.city.clone())),
        }
    }

    pub fn into_record(
        self,
        id: Uuid,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Address, AppError> {
        Ok(Address {
            id,
            owner_id,
            name: required(self.name, "name")?,
            address1: required(self.address1, "address1")?,
            address2: self.address2.unwrap_or_default(),
            zip_code: required(self.zip_code, "zip_code")?,
            city: required(self.city, "city")?,
            created_at,
        })
    }
}
