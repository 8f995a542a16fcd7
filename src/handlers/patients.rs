// src/handlers/patients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppQuery},
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::patient::{Patient, PatientPayload},
    services::{
        cascade::{self, Root},
        filters::PatientFilter,
        references::ensure_exists,
    },
};

async fn find_patient(app_state: &AppState, id: Uuid) -> Result<Patient, AppError> {
    app_state
        .store
        .patients
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Paciente não encontrado."))
}

// Valida o payload e confere se o endereço existe
async fn build_record(
    app_state: &AppState,
    payload: PatientPayload,
    id: Uuid,
    owner_id: Uuid,
    created_at: chrono::DateTime<Utc>,
) -> Result<Patient, AppError> {
    payload.validate()?;
    let record = payload.into_record(id, owner_id, created_at)?;
    ensure_exists(app_state.store.addresses.as_ref(), "address", record.address_id).await?;
    Ok(record)
}

async fn save(app_state: &AppState, current: &Patient, payload: PatientPayload) -> Result<Patient, AppError> {
    let record = build_record(app_state, payload, current.id, current.owner_id, current.created_at).await?;

    app_state
        .store
        .patients
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Paciente não encontrado."))
}

// GET /api/heroad/patients
#[utoipa::path(
    get,
    path = "/api/heroad/patients",
    tag = "Patients",
    params(PatientFilter),
    responses(
        (status = 200, description = "Pacientes", body = Vec<Patient>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_patients(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<PatientFilter>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let patients = app_state.store.patients.list().await?;
    Ok(Json(filter.conditions().apply(patients)))
}

// POST /api/heroad/patients
#[utoipa::path(
    post,
    path = "/api/heroad/patients",
    tag = "Patients",
    request_body = PatientPayload,
    responses(
        (status = 201, description = "Paciente criado", body = Patient),
        (status = 400, description = "Dados inválidos ou endereço inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<PatientPayload>,
) -> Result<impl IntoResponse, AppError> {
    let record = build_record(&app_state, payload, Uuid::new_v4(), user.id, Utc::now()).await?;

    let patient = app_state.store.patients.insert(&record).await?;
    tracing::info!("🧑 Paciente criado: {} ({})", patient, patient.id);

    Ok((StatusCode::CREATED, Json(patient)))
}

// GET /api/heroad/patients/{id}
#[utoipa::path(
    get,
    path = "/api/heroad/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente", body = Patient),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_patient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, AppError> {
    Ok(Json(find_patient(&app_state, id).await?))
}

// PUT /api/heroad/patients/{id}
#[utoipa::path(
    put,
    path = "/api/heroad/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    request_body = PatientPayload,
    responses(
        (status = 200, description = "Paciente substituído", body = Patient),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_patient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<PatientPayload>,
) -> Result<Json<Patient>, AppError> {
    let current = find_patient(&app_state, id).await?;
    Ok(Json(save(&app_state, &current, payload).await?))
}

// PATCH /api/heroad/patients/{id}
#[utoipa::path(
    patch,
    path = "/api/heroad/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    request_body = PatientPayload,
    responses(
        (status = 200, description = "Paciente atualizado", body = Patient),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn partial_update_patient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<PatientPayload>,
) -> Result<Json<Patient>, AppError> {
    let current = find_patient(&app_state, id).await?;
    let payload = payload.merged_onto(&current);
    Ok(Json(save(&app_state, &current, payload).await?))
}

// DELETE /api/heroad/patients/{id}
#[utoipa::path(
    delete,
    path = "/api/heroad/patients/{id}",
    tag = "Patients",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 204, description = "Paciente e suas corridas foram apagados"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_patient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::Patient(id)).await? {
        return Err(AppError::NotFound("Paciente não encontrado."));
    }
    Ok(StatusCode::NO_CONTENT)
}
