// src/handlers/master_runs.rs

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
    models::run::{MasterRun, MasterRunDetail, MasterRunPayload},
    services::{
        cascade::{self, Root},
        filters::MasterRunFilter,
        references::{ensure_all_exist, ensure_exists, ensure_users_exist},
    },
};

async fn find_master_run(app_state: &AppState, id: Uuid) -> Result<MasterRun, AppError> {
    app_state
        .store
        .master_runs
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Tournée não encontrada."))
}

// Anexa as corridas que apontam para cada tournée (somente leitura)
async fn with_runs(
    app_state: &AppState,
    master_runs: Vec<MasterRun>,
) -> Result<Vec<MasterRunDetail>, AppError> {
    let ids: Vec<Uuid> = master_runs.iter().map(|m| m.id).collect();
    let mut runs_by_master: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for run in app_state.store.runs.list_by_master_runs(&ids).await? {
        runs_by_master.entry(run.master_run_id).or_default().push(run.id);
    }

    Ok(master_runs
        .into_iter()
        .map(|master_run| MasterRunDetail {
            runs: runs_by_master.remove(&master_run.id).unwrap_or_default(),
            master_run,
        })
        .collect())
}

async fn detail(app_state: &AppState, master_run: MasterRun) -> Result<MasterRunDetail, AppError> {
    let mut details = with_runs(app_state, vec![master_run]).await?;
    details
        .pop()
        .ok_or_else(|| anyhow::anyhow!("tournée perdida ao montar o detalhe").into())
}

async fn build_record(
    app_state: &AppState,
    payload: MasterRunPayload,
    id: Uuid,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
) -> Result<MasterRun, AppError> {
    payload.validate()?;
    let record = payload.into_record(id, owner_id, created_at)?;

    let store = &app_state.store;
    ensure_exists(store.vehicles.as_ref(), "vehicle", record.vehicle_id).await?;
    ensure_users_exist(store.users.as_ref(), "drivers", &record.drivers).await?;
    ensure_all_exist(store.patients.as_ref(), "patients", &record.patients).await?;

    Ok(record)
}

async fn save(
    app_state: &AppState,
    current: &MasterRun,
    payload: MasterRunPayload,
) -> Result<MasterRunDetail, AppError> {
    let record =
        build_record(app_state, payload, current.id, current.owner_id, current.created_at).await?;

    let updated = app_state
        .store
        .master_runs
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Tournée não encontrada."))?;

    detail(app_state, updated).await
}

// GET /api/heroad/master-runs
#[utoipa::path(
    get,
    path = "/api/heroad/master-runs",
    tag = "Master runs",
    params(MasterRunFilter),
    responses(
        (status = 200, description = "Tournées com suas corridas", body = Vec<MasterRunDetail>),
        (status = 400, description = "Filtro inválido"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_master_runs(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<MasterRunFilter>,
) -> Result<Json<Vec<MasterRunDetail>>, AppError> {
    let store = &app_state.store;
    let master_runs = store.master_runs.list().await?;

    let vehicles: HashMap<Uuid, _> = if filter.needs_vehicles() {
        store.vehicles.list().await?.into_iter().map(|v| (v.id, v)).collect()
    } else {
        HashMap::new()
    };

    let master_runs = filter.conditions(&vehicles)?.apply(master_runs);
    Ok(Json(with_runs(&app_state, master_runs).await?))
}

// POST /api/heroad/master-runs
#[utoipa::path(
    post,
    path = "/api/heroad/master-runs",
    tag = "Master runs",
    request_body = MasterRunPayload,
    responses(
        (status = 201, description = "Tournée criada", body = MasterRunDetail),
        (status = 400, description = "Dados inválidos ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_master_run(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<MasterRunPayload>,
) -> Result<impl IntoResponse, AppError> {
    let record = build_record(&app_state, payload, Uuid::new_v4(), user.id, Utc::now()).await?;

    let master_run = app_state.store.master_runs.insert(&record).await?;
    tracing::info!(
        "🗓️ Tournée {} criada com {} motorista(s) e {} paciente(s)",
        master_run.id,
        master_run.drivers.len(),
        master_run.patients.len()
    );

    // Recém-criada: ainda não há corridas apontando para ela
    let body = MasterRunDetail {
        master_run,
        runs: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// GET /api/heroad/master-runs/{id}
#[utoipa::path(
    get,
    path = "/api/heroad/master-runs/{id}",
    tag = "Master runs",
    params(("id" = Uuid, Path, description = "ID da tournée")),
    responses(
        (status = 200, description = "Tournée", body = MasterRunDetail),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_master_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MasterRunDetail>, AppError> {
    let master_run = find_master_run(&app_state, id).await?;
    Ok(Json(detail(&app_state, master_run).await?))
}

// PUT /api/heroad/master-runs/{id}
#[utoipa::path(
    put,
    path = "/api/heroad/master-runs/{id}",
    tag = "Master runs",
    params(("id" = Uuid, Path, description = "ID da tournée")),
    request_body = MasterRunPayload,
    responses(
        (status = 200, description = "Tournée substituída", body = MasterRunDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_master_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MasterRunPayload>,
) -> Result<Json<MasterRunDetail>, AppError> {
    let current = find_master_run(&app_state, id).await?;
    Ok(Json(save(&app_state, &current, payload).await?))
}

// PATCH /api/heroad/master-runs/{id}
#[utoipa::path(
    patch,
    path = "/api/heroad/master-runs/{id}",
    tag = "Master runs",
    params(("id" = Uuid, Path, description = "ID da tournée")),
    request_body = MasterRunPayload,
    responses(
        (status = 200, description = "Tournée atualizada", body = MasterRunDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn partial_update_master_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MasterRunPayload>,
) -> Result<Json<MasterRunDetail>, AppError> {
    let current = find_master_run(&app_state, id).await?;
    let payload = payload.merged_onto(&current);
    Ok(Json(save(&app_state, &current, payload).await?))
}

// DELETE /api/heroad/master-runs/{id}
#[utoipa::path(
    delete,
    path = "/api/heroad/master-runs/{id}",
    tag = "Master runs",
    params(("id" = Uuid, Path, description = "ID da tournée")),
    responses(
        (status = 204, description = "Tournée e suas corridas foram apagadas"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_master_run(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::MasterRun(id)).await? {
        return Err(AppError::NotFound("Tournée não encontrada."));
    }
    Ok(StatusCode::NO_CONTENT)
}
