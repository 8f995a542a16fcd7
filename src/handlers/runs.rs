// src/handlers/runs.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppQuery},
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        address::Address,
        run::{Run, RunPayload},
    },
    services::{
        cascade::{self, Root},
        filters::RunFilter,
        references::ensure_exists,
    },
};

async fn find_run(app_state: &AppState, id: Uuid) -> Result<Run, AppError> {
    app_state
        .store
        .runs
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Corrida não encontrada."))
}

// Valida e resolve as quatro referências. Devolve também o endereço de destino.
async fn build_record(
    app_state: &AppState,
    payload: RunPayload,
    id: Uuid,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
) -> Result<(Run, Address), AppError> {
    payload.validate()?;
    let record = payload.into_record(id, owner_id, created_at)?;

    let store = &app_state.store;
    ensure_exists(store.addresses.as_ref(), "pick_up_location", record.pick_up_location_id).await?;
    let deposit =
        ensure_exists(store.addresses.as_ref(), "deposit_location", record.deposit_location_id).await?;
    ensure_exists(store.master_runs.as_ref(), "master_run", record.master_run_id).await?;
    ensure_exists(store.patients.as_ref(), "patient", record.patient_id).await?;

    Ok((record, deposit))
}

async fn save(app_state: &AppState, current: &Run, payload: RunPayload) -> Result<Run, AppError> {
    let (record, _) =
        build_record(app_state, payload, current.id, current.owner_id, current.created_at).await?;

    app_state
        .store
        .runs
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Corrida não encontrada."))
}

// GET /api/heroad/runs
#[utoipa::path(
    get,
    path = "/api/heroad/runs",
    tag = "Runs",
    params(RunFilter),
    responses(
        (status = 200, description = "Corridas", body = Vec<Run>),
        (status = 400, description = "Filtro inválido"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_runs(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<RunFilter>,
) -> Result<Json<Vec<Run>>, AppError> {
    let store = &app_state.store;
    let runs = store.runs.list().await?;

    let addresses: HashMap<Uuid, _> = if filter.needs_addresses() {
        store.addresses.list().await?.into_iter().map(|a| (a.id, a)).collect()
    } else {
        HashMap::new()
    };
    let patients: HashMap<Uuid, _> = if filter.needs_patients() {
        store.patients.list().await?.into_iter().map(|p| (p.id, p)).collect()
    } else {
        HashMap::new()
    };

    let runs = filter.conditions(&addresses, &patients)?.apply(runs);
    Ok(Json(runs))
}

// POST /api/heroad/runs
#[utoipa::path(
    post,
    path = "/api/heroad/runs",
    tag = "Runs",
    request_body = RunPayload,
    responses(
        (status = 201, description = "Corrida criada", body = Run),
        (status = 400, description = "Dados inválidos ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_run(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<RunPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (record, deposit) =
        build_record(&app_state, payload, Uuid::new_v4(), user.id, Utc::now()).await?;

    let run = app_state.store.runs.insert(&record).await?;
    tracing::info!("🛣️ Corrida criada: {}", run.display_with(&deposit));

    Ok((StatusCode::CREATED, Json(run)))
}

// GET /api/heroad/runs/{id}
#[utoipa::path(
    get,
    path = "/api/heroad/runs/{id}",
    tag = "Runs",
    params(("id" = Uuid, Path, description = "ID da corrida")),
    responses(
        (status = 200, description = "Corrida", body = Run),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Run>, AppError> {
    Ok(Json(find_run(&app_state, id).await?))
}

// PUT /api/heroad/runs/{id}
#[utoipa::path(
    put,
    path = "/api/heroad/runs/{id}",
    tag = "Runs",
    params(("id" = Uuid, Path, description = "ID da corrida")),
    request_body = RunPayload,
    responses(
        (status = 200, description = "Corrida substituída", body = Run),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RunPayload>,
) -> Result<Json<Run>, AppError> {
    let current = find_run(&app_state, id).await?;
    Ok(Json(save(&app_state, &current, payload).await?))
}

// PATCH /api/heroad/runs/{id}
#[utoipa::path(
    patch,
    path = "/api/heroad/runs/{id}",
    tag = "Runs",
    params(("id" = Uuid, Path, description = "ID da corrida")),
    request_body = RunPayload,
    responses(
        (status = 200, description = "Corrida atualizada", body = Run),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn partial_update_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RunPayload>,
) -> Result<Json<Run>, AppError> {
    let current = find_run(&app_state, id).await?;
    let payload = payload.merged_onto(&current);
    Ok(Json(save(&app_state, &current, payload).await?))
}

// DELETE /api/heroad/runs/{id}
#[utoipa::path(
    delete,
    path = "/api/heroad/runs/{id}",
    tag = "Runs",
    params(("id" = Uuid, Path, description = "ID da corrida")),
    responses(
        (status = 204, description = "Corrida apagada"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::Run(id)).await? {
        return Err(AppError::NotFound("Corrida não encontrada."));
    }
    Ok(StatusCode::NO_CONTENT)
}
