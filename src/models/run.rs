// src/models/run.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::Record,
    models::{address::Address, required},
};

// ---
// Run: um trajeto (buscar -> deixar) de um paciente
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Run {
    pub id: Uuid,

    #[serde(rename = "user")]
    pub owner_id: Uuid,

    pub date: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
    pub arriving_time: DateTime<Utc>,

    // Podem apontar para o mesmo endereço
    #[serde(rename = "pick_up_location")]
    pub pick_up_location_id: Uuid,
    #[serde(rename = "deposit_location")]
    pub deposit_location_id: Uuid,

    pub is_return_path: bool,
    pub comments: String,

    #[serde(rename = "master_run")]
    pub master_run_id: Uuid,

    #[serde(rename = "patient")]
    pub patient_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl Run {
    /// "data destino", ex: "2024-03-01 08:00:00 UTC Bordeaux, 1 rue de la fontaine, 33000".
    pub fn display_with(&self, deposit_location: &Address) -> String {
        format!("{} {}", self.date, deposit_location)
    }
}

impl Record for Run {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RunPayload {
    #[validate(required(message = "A data é obrigatória."))]
    pub date: Option<DateTime<Utc>>,

    #[validate(required(message = "O horário de partida é obrigatório."))]
    pub departure_time: Option<DateTime<Utc>>,

    #[validate(required(message = "O horário de chegada é obrigatório."))]
    pub arriving_time: Option<DateTime<Utc>>,

    #[validate(required(message = "O local de embarque é obrigatório."))]
    pub pick_up_location: Option<Uuid>,

    #[validate(required(message = "O local de destino é obrigatório."))]
    pub deposit_location: Option<Uuid>,

    pub is_return_path: Option<bool>,

    #[validate(length(max = 255, message = "Os comentários devem ter no máximo 255 caracteres."))]
    pub comments: Option<String>,

    #[validate(required(message = "A corrida principal é obrigatória."))]
    pub master_run: Option<Uuid>,

    #[validate(required(message = "O paciente é obrigatório."))]
    pub patient: Option<Uuid>,
}

impl RunPayload {
    pub fn merged_onto(self, current: &Run) -> Self {
        Self {
            date: self.date.or(Some(current.date)),
            departure_time: self.departure_time.or(Some(current.departure_time)),
            arriving_time: self.arriving_time.or(Some(current.arriving_time)),
            pick_up_location: self.pick_up_location.or(Some(current.pick_up_location_id)),
            deposit_location: self.deposit_location.or(Some(current.deposit_location_id)),
            is_return_path: self.is_return_path.or(Some(current.is_return_path)),
            comments: self.comments.or_else(|| Some(current.comments.clone())),
            master_run: self.master_run.or(Some(current.master_run_id)),
            patient: self.patient.or(Some(current.patient_id)),
        }
    }

    pub fn into_record(
        self,
        id: Uuid,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Run, AppError> {
        Ok(Run {
            id,
            owner_id,
            date: required(self.date, "date")?,
            departure_time: required(self.departure_time, "departure_time")?,
            arriving_time: required(self.arriving_time, "arriving_time")?,
            pick_up_location_id: required(self.pick_up_location, "pick_up_location")?,
            deposit_location_id: required(self.deposit_location, "deposit_location")?,
            is_return_path: self.is_return_path.unwrap_or(false),
            comments: self.comments.unwrap_or_default(),
            master_run_id: required(self.master_run, "master_run")?,
            patient_id: required(self.patient, "patient")?,
            created_at,
        })
    }
}

// ---
// MasterRun: a tournée de um veículo (um turno), com motoristas e corridas
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MasterRun {
    pub id: Uuid,

    #[serde(rename = "user")]
    pub owner_id: Uuid,

    pub comments: String,
    pub date: DateTime<Utc>,
    pub am: bool,
    pub pm: bool,

    #[serde(rename = "vehicle")]
    pub vehicle_id: Uuid,

    // Contas dos motoristas (M2M)
    pub drivers: Vec<Uuid>,

    // Pacientes agendados na tournée (M2M)
    pub patients: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Record for MasterRun {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

// Resposta da API: a tournée + as corridas que apontam para ela (somente leitura)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MasterRunDetail {
    #[serde(flatten)]
    pub master_run: MasterRun,

    pub runs: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct MasterRunPayload {
    #[validate(length(max = 255, message = "Os comentários devem ter no máximo 255 caracteres."))]
    pub comments: Option<String>,

    #[validate(required(message = "A data é obrigatória."))]
    pub date: Option<DateTime<Utc>>,

    pub am: Option<bool>,
    pub pm: Option<bool>,

    #[validate(required(message = "O veículo é obrigatório."))]
    pub vehicle: Option<Uuid>,

    // "users" era o nome antigo do campo
    #[serde(alias = "users")]
    pub drivers: Option<Vec<Uuid>>,

    pub patients: Option<Vec<Uuid>>,
}

impl MasterRunPayload {
    pub fn merged_onto(self, current: &MasterRun) -> Self {
        Self {
            comments: self.comments.or_else(|| Some(current.comments.clone())),
            date: self.date.or(Some(current.date)),
            am: self.am.or(Some(current.am)),
            pm: self.pm.or(Some(current.pm)),
            vehicle: self.vehicle.or(Some(current.vehicle_id)),
            drivers: self.drivers.or_else(|| Some(current.drivers.clone())),
            patients: self.patients.or_else(|| Some(current.patients.clone())),
        }
    }

    pub fn into_record(
        self,
        id: Uuid,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<MasterRun, AppError> {
        Ok(MasterRun {
            id,
            owner_id,
            comments: self.comments.unwrap_or_default(),
            date: required(self.date, "date")?,
            am: self.am.unwrap_or(false),
            pm: self.pm.unwrap_or(false),
            vehicle_id: required(self.vehicle, "vehicle")?,
            drivers: dedup(self.drivers.unwrap_or_default()),
            patients: dedup(self.patients.unwrap_or_default()),
            created_at,
        })
    }
}

// Mantém a ordem de chegada, sem repetir ids
fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_comments_and_return_flag_are_optional() {
        let payload = RunPayload {
            date: Some(Utc::now()),
            departure_time: Some(Utc::now()),
            arriving_time: Some(Utc::now()),
            pick_up_location: Some(Uuid::new_v4()),
            deposit_location: Some(Uuid::new_v4()),
            master_run: Some(Uuid::new_v4()),
            patient: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());

        let run = payload
            .into_record(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert!(!run.is_return_path);
        assert_eq!(run.comments, "");
    }

    #[test]
    fn run_without_patient_is_rejected() {
        let payload = RunPayload {
            date: Some(Utc::now()),
            departure_time: Some(Utc::now()),
            arriving_time: Some(Utc::now()),
            pick_up_location: Some(Uuid::new_v4()),
            deposit_location: Some(Uuid::new_v4()),
            master_run: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("patient"));
    }

    #[test]
    fn run_display_uses_the_deposit_address() {
        let date = "2024-03-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let address = Address {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Domicile".into(),
            address1: "1 rue de la fontaine".into(),
            address2: String::new(),
            zip_code: 33000,
            city: "Bordeaux".into(),
            created_at: Utc::now(),
        };
        let run = RunPayload {
            date: Some(date),
            departure_time: Some(date),
            arriving_time: Some(date),
            pick_up_location: Some(address.id),
            deposit_location: Some(address.id),
            master_run: Some(Uuid::new_v4()),
            patient: Some(Uuid::new_v4()),
            ..Default::default()
        }
        .into_record(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
        .unwrap();

        assert_eq!(
            run.display_with(&address),
            "2024-03-01 08:00:00 UTC Bordeaux, 1 rue de la fontaine, 33000"
        );
    }

    #[test]
    fn users_is_accepted_as_drivers() {
        let driver = Uuid::new_v4();
        let json = format!(
            r#"{{"date": "2024-03-01T08:00:00Z", "vehicle": "{}", "users": ["{}", "{}"]}}"#,
            Uuid::new_v4(),
            driver,
            driver
        );
        let payload: MasterRunPayload = serde_json::from_str(&json).unwrap();
        let master_run = payload
            .into_record(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(master_run.drivers, vec![driver]);
    }

    #[test]
    fn detail_flattens_master_run() {
        let master_run = MasterRunPayload {
            date: Some(Utc::now()),
            am: Some(true),
            vehicle: Some(Uuid::new_v4()),
            ..Default::default()
        }
        .into_record(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
        .unwrap();
        let run_id = Uuid::new_v4();

        let json = serde_json::to_value(MasterRunDetail {
            master_run: master_run.clone(),
            runs: vec![run_id],
        })
        .unwrap();

        assert_eq!(json["id"], master_run.id.to_string());
        assert_eq!(json["am"], true);
        assert_eq!(json["runs"][0], run_id.to_string());
    }
}
