// src/models/vehicle.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, db::Record, models::required};

// Mapeia o CREATE TYPE vehicle_type do banco
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vehicle_type")]
pub enum VehicleType {
    #[serde(rename = "VSL")]
    #[sqlx(rename = "VSL")]
    Vsl,
    #[default]
    Ambulance,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Vsl => "VSL",
            VehicleType::Ambulance => "Ambulance",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vehicle {
    pub id: Uuid,

    #[serde(rename = "user")]
    pub owner_id: Uuid,

    #[serde(rename = "type")]
    pub kind: VehicleType,

    #[schema(example = "AA-123-AA")]
    pub license_plate: String,

    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Vehicle {
    // "VSL AA-123-AA"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.license_plate)
    }
}

impl Record for Vehicle {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct VehiclePayload {
    // Um tipo fora do enum já falha na desserialização (400)
    #[serde(rename = "type")]
    #[schema(example = "Ambulance")]
    pub kind: Option<VehicleType>,

    #[validate(
        required(message = "A placa é obrigatória."),
        length(min = 1, max = 9, message = "A placa deve ter entre 1 e 9 caracteres.")
    )]
    #[schema(example = "AA-123-AA")]
    pub license_plate: Option<String>,
}

impl VehiclePayload {
    pub fn merged_onto(self, current: &Vehicle) -> Self {
        Self {
            kind: self.kind.or(Some(current.kind)),
            license_plate: self
                .license_plate
                .or_else(|| Some(current.license_plate.clone())),
        }
    }

    pub fn into_record(
        self,
        id: Uuid,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Vehicle, AppError> {
        Ok(Vehicle {
            id,
            owner_id,
            kind: self.kind.unwrap_or_default(),
            license_plate: required(self.license_plate, "license_plate")?,
            created_at,
        })
    }
}
