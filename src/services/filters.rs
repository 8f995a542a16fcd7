// src/services/filters.rs
//
// Filtros das listagens. Cada chave da query string vira um predicado sobre a
// entidade; chaves diferentes se combinam com AND e as alternativas de uma mesma
// chave (ex: nome OU sobrenome) com OR. Toda comparação de texto ignora caixa.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        address::Address,
        patient::Patient,
        recipe::Recipe,
        run::{MasterRun, Run},
        vehicle::{Vehicle, VehicleType},
    },
};

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;

/// Conjunto de predicados combinados com AND. Sem predicados, tudo passa.
pub struct Conditions<'a, T> {
    predicates: Vec<Predicate<'a, T>>,
}

impl<'a, T> Default for Conditions<'a, T> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

impl<'a, T> Conditions<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'a) {
        self.predicates.push(Box::new(predicate));
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|predicate| predicate(item))
    }

    /// Mantém a ordem original da listagem.
    pub fn apply(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filtro composto de localização: qualquer parte do endereço contém o texto.
pub fn matches_location(address: &Address, text: &str) -> bool {
    contains_ci(&address.address1, text)
        || contains_ci(&address.address2, text)
        || contains_ci(&address.city, text)
        || contains_ci(&address.zip_code.to_string(), text)
        || contains_ci(&address.name, text)
}

// Valor vazio na query string (`?location=`) é o mesmo que não filtrar
fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Limite inferior inclusivo para os filtros de data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBound(pub DateTime<Utc>);

impl DateBound {
    /// Aceita RFC 3339 ou só a data (`YYYY-MM-DD`, meia-noite UTC).
    pub fn parse(field: &str, raw: &str) -> Result<Self, AppError> {
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self(instant.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|midnight| Self(midnight.and_utc()))
            .ok_or_else(|| {
                AppError::InvalidQuery(format!("'{}': data inválida '{}'", field, raw))
            })
    }

    fn from_query(field: &str, value: &Option<String>) -> Result<Option<Self>, AppError> {
        text(value).map(|raw| Self::parse(field, raw)).transpose()
    }

    pub fn admits(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.0
    }
}

/// `tags=<id>,<id>`: lista de ids separados por vírgula.
pub fn parse_ids(field: &str, raw: &str) -> Result<Vec<Uuid>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part).map_err(|_| {
                AppError::InvalidQuery(format!("'{}': id inválido '{}'", field, part))
            })
        })
        .collect()
}

// =========================================================================
//  HEROAD
// =========================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressFilter {
    /// Texto em qualquer parte do endereço (linhas, cidade, CEP, nome)
    pub location: Option<String>,
}

impl AddressFilter {
    pub fn conditions(&self) -> Conditions<'_, Address> {
        let mut conditions = Conditions::new();
        if let Some(location) = text(&self.location) {
            conditions.push(move |address: &Address| matches_location(address, location));
        }
        conditions
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientFilter {
    /// Nome, sobrenome ou telefone
    pub search: Option<String>,
}

impl PatientFilter {
    pub fn conditions(&self) -> Conditions<'_, Patient> {
        let mut conditions = Conditions::new();
        if let Some(search) = text(&self.search) {
            conditions.push(move |patient: &Patient| {
                contains_ci(&patient.firstname, search)
                    || contains_ci(&patient.lastname, search)
                    || contains_ci(&patient.phone_number, search)
            });
        }
        conditions
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VehicleFilter {
    /// Parte da placa
    pub search: Option<String>,

    #[serde(rename = "type")]
    pub kind: Option<VehicleType>,
}

impl VehicleFilter {
    pub fn conditions(&self) -> Conditions<'_, Vehicle> {
        let mut conditions = Conditions::new();
        if let Some(search) = text(&self.search) {
            conditions.push(move |vehicle: &Vehicle| contains_ci(&vehicle.license_plate, search));
        }
        if let Some(kind) = self.kind {
            conditions.push(move |vehicle: &Vehicle| vehicle.kind == kind);
        }
        conditions
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RunFilter {
    /// Filtro de localização aplicado ao endereço de embarque
    pub pick_up_location: Option<String>,
    /// Filtro de localização aplicado ao endereço de destino
    pub deposit_location: Option<String>,
    /// Nome ou sobrenome do paciente
    pub patient: Option<String>,
    /// A partir de (RFC 3339 ou YYYY-MM-DD)
    pub date: Option<String>,
    pub departure_time: Option<String>,
    pub arriving_time: Option<String>,
}

impl RunFilter {
    pub fn needs_addresses(&self) -> bool {
        text(&self.pick_up_location).is_some() || text(&self.deposit_location).is_some()
    }

    pub fn needs_patients(&self) -> bool {
        text(&self.patient).is_some()
    }

    /// `addresses` e `patients` indexados por id; só são consultados se o filtro pedir.
    pub fn conditions<'a>(
        &'a self,
        addresses: &'a HashMap<Uuid, Address>,
        patients: &'a HashMap<Uuid, Patient>,
    ) -> Result<Conditions<'a, Run>, AppError> {
        let mut conditions = Conditions::new();

        if let Some(location) = text(&self.pick_up_location) {
            conditions.push(move |run: &Run| {
                addresses
                    .get(&run.pick_up_location_id)
                    .is_some_and(|address| matches_location(address, location))
            });
        }
        if let Some(location) = text(&self.deposit_location) {
            conditions.push(move |run: &Run| {
                addresses
                    .get(&run.deposit_location_id)
                    .is_some_and(|address| matches_location(address, location))
            });
        }
        if let Some(name) = text(&self.patient) {
            conditions.push(move |run: &Run| {
                patients.get(&run.patient_id).is_some_and(|patient| {
                    contains_ci(&patient.firstname, name) || contains_ci(&patient.lastname, name)
                })
            });
        }
        if let Some(bound) = DateBound::from_query("date", &self.date)? {
            conditions.push(move |run: &Run| bound.admits(run.date));
        }
        if let Some(bound) = DateBound::from_query("departure_time", &self.departure_time)? {
            conditions.push(move |run: &Run| bound.admits(run.departure_time));
        }
        if let Some(bound) = DateBound::from_query("arriving_time", &self.arriving_time)? {
            conditions.push(move |run: &Run| bound.admits(run.arriving_time));
        }

        Ok(conditions)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MasterRunFilter {
    /// Comentários ou placa do veículo
    pub search: Option<String>,
    /// A partir de (RFC 3339 ou YYYY-MM-DD)
    pub date: Option<String>,
}

impl MasterRunFilter {
    pub fn needs_vehicles(&self) -> bool {
        text(&self.search).is_some()
    }

    pub fn conditions<'a>(
        &'a self,
        vehicles: &'a HashMap<Uuid, Vehicle>,
    ) -> Result<Conditions<'a, MasterRun>, AppError> {
        let mut conditions = Conditions::new();

        if let Some(search) = text(&self.search) {
            conditions.push(move |master_run: &MasterRun| {
                contains_ci(&master_run.comments, search)
                    || vehicles
                        .get(&master_run.vehicle_id)
                        .is_some_and(|vehicle| contains_ci(&vehicle.license_plate, search))
            });
        }
        if let Some(bound) = DateBound::from_query("date", &self.date)? {
            conditions.push(move |master_run: &MasterRun| bound.admits(master_run.date));
        }

        Ok(conditions)
    }
}

// =========================================================================
//  RECEITAS
// =========================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeFilter {
    /// Ids de tags separados por vírgula
    pub tags: Option<String>,
    /// Ids de ingredientes separados por vírgula
    pub ingredients: Option<String>,
}

impl RecipeFilter {
    pub fn conditions(&self) -> Result<Conditions<'static, Recipe>, AppError> {
        let mut conditions = Conditions::new();

        if let Some(raw) = text(&self.tags) {
            let wanted = parse_ids("tags", raw)?;
            conditions.push(move |recipe: &Recipe| recipe.tags.iter().any(|id| wanted.contains(id)));
        }
        if let Some(raw) = text(&self.ingredients) {
            let wanted = parse_ids("ingredients", raw)?;
            conditions.push(move |recipe: &Recipe| {
                recipe.ingredients.iter().any(|id| wanted.contains(id))
            });
        }

        Ok(conditions)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignedFilter {
    /// `1` mantém só o que está em alguma receita
    pub assigned_only: Option<u8>,
}

impl AssignedFilter {
    pub fn is_set(&self) -> bool {
        self.assigned_only.unwrap_or(0) != 0
    }

    /// Ids de tags (ou ingredientes) usados por alguma receita.
    pub fn assigned_ids<'r>(
        recipes: &'r [Recipe],
        ids_of: impl Fn(&'r Recipe) -> &'r [Uuid],
    ) -> HashSet<Uuid> {
        recipes.iter().flat_map(|recipe| ids_of(recipe).iter().copied()).collect()
    }
}
