// src/models/patient.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, db::Record, models::required};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: Uuid,

    #[serde(rename = "user")]
    pub owner_id: Uuid,

    #[schema(example = "Thierry")]
    pub firstname: String,

    #[schema(example = "Henry")]
    pub lastname: String,

    #[schema(example = "0798765678")]
    pub phone_number: String,

    // Paciente que precisa de atenção especial no transporte
    pub special: bool,

    pub description: String,

    #[serde(rename = "address")]
    pub address_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.firstname, self.lastname)
    }
}

impl Record for Patient {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PatientPayload {
    #[validate(
        required(message = "O nome é obrigatório."),
        length(min = 1, max = 255, message = "O nome deve ter entre 1 e 255 caracteres.")
    )]
    #[schema(example = "Testfirst")]
    pub firstname: Option<String>,

    #[validate(
        required(message = "O sobrenome é obrigatório."),
        length(min = 1, max = 255, message = "O sobrenome deve ter entre 1 e 255 caracteres.")
    )]
    #[schema(example = "Testlast")]
    pub lastname: Option<String>,

    // A coluna tem 10 caracteres
    #[validate(
        required(message = "O telefone é obrigatório."),
        length(min = 1, max = 10, message = "O telefone deve ter no máximo 10 caracteres.")
    )]
    #[schema(example = "0756897687")]
    pub phone_number: Option<String>,

    pub special: Option<bool>,

    #[validate(length(max = 255, message = "A descrição deve ter no máximo 255 caracteres."))]
    pub description: Option<String>,

    #[validate(required(message = "O endereço é obrigatório."))]
    pub address: Option<Uuid>,
}

impl PatientPayload {
    pub fn merged_onto(self, current: &Patient) -> Self {
        Self {
            firstname: self.firstname.or_else(|| Some(current.firstname.clone())),
            lastname: self.lastname.or_else(|| Some(current.lastname.clone())),
            phone_number: self
                .phone_number
                .or_else(|| Some(current.phone_number.clone())),
            special: self.special.or(Some(current.special)),
            description: self
                .description
                .or_else(|| Some(current.description.clone())),
            address: self.address.or(Some(current.address_id)),
        }
    }

    pub fn into_record(
        self,
        id: Uuid,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Patient, AppError> {
        Ok(Patient {
            id,
            owner_id,
            firstname: required(self.firstname, "firstname")?,
            lastname: required(self.lastname, "lastname")?,
            phone_number: required(self.phone_number, "phone_number")?,
            special: self.special.unwrap_or(false),
            description: self.description.unwrap_or_default(),
            address_id: required(self.address, "address")?,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_payload() -> PatientPayload {
        PatientPayload {
            firstname: Some("Testfirst".into()),
            lastname: Some("Testlast".into()),
            phone_number: Some("0756897687".into()),
            special: None,
            description: Some("This is a description".into()),
            address: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(valid_payload().validate().is_ok());
    }

    #[rstest]
    #[case::firstname("firstname")]
    #[case::lastname("lastname")]
    #[case::phone_number("phone_number")]
    #[case::address("address")]
    fn missing_required_field_is_rejected(#[case] field: &str) {
        let mut payload = valid_payload();
        match field {
            "firstname" => payload.firstname = None,
            "lastname" => payload.lastname = None,
            "phone_number" => payload.phone_number = None,
            _ => payload.address = None,
        }

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key(field));
    }

    #[rstest]
    #[case("0987978987890", false)]
    #[case("01234567890", false)]
    #[case("0123456789", true)]
    #[case("", false)]
    fn phone_number_fits_ten_chars(#[case] phone: &str, #[case] ok: bool) {
        let payload = PatientPayload {
            phone_number: Some(phone.into()),
            ..valid_payload()
        };
        assert_eq!(payload.validate().is_ok(), ok);
    }

    #[test]
    fn display_is_full_name() {
        let patient = valid_payload()
            .into_record(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(patient.to_string(), "Testfirst Testlast");
        assert!(!patient.special);
    }
}
