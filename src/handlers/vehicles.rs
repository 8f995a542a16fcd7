// src/handlers/vehicles.rs

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
    models::vehicle::{Vehicle, VehiclePayload},
    services::{
        cascade::{self, Root},
        filters::VehicleFilter,
    },
};

async fn find_vehicle(app_state: &AppState, id: Uuid) -> Result<Vehicle, AppError> {
    app_state
        .store
        .vehicles
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Veículo não encontrado."))
}

async fn save(app_state: &AppState, current: &Vehicle, payload: VehiclePayload) -> Result<Vehicle, AppError> {
    payload.validate()?;
    let record = payload.into_record(current.id, current.owner_id, current.created_at)?;

    app_state
        .store
        .vehicles
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Veículo não encontrado."))
}

// GET /api/heroad/vehicles
#[utoipa::path(
    get,
    path = "/api/heroad/vehicles",
    tag = "Vehicles",
    params(VehicleFilter),
    responses(
        (status = 200, description = "Veículos", body = Vec<Vehicle>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_vehicles(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<VehicleFilter>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let vehicles = app_state.store.vehicles.list().await?;
    Ok(Json(filter.conditions().apply(vehicles)))
}

// POST /api/heroad/vehicles
#[utoipa::path(
    post,
    path = "/api/heroad/vehicles",
    tag = "Vehicles",
    request_body = VehiclePayload,
    responses(
        (status = 201, description = "Veículo criado", body = Vehicle),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vehicle(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<VehiclePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = payload.into_record(Uuid::new_v4(), user.id, Utc::now())?;

    let vehicle = app_state.store.vehicles.insert(&record).await?;
    tracing::info!("🚑 Veículo criado: {}", vehicle);

    Ok((StatusCode::CREATED, Json(vehicle)))
}

// GET /api/heroad/vehicles/{id}
#[utoipa::path(
    get,
    path = "/api/heroad/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo", body = Vehicle),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    Ok(Json(find_vehicle(&app_state, id).await?))
}

// PUT /api/heroad/vehicles/{id}
#[utoipa::path(
    put,
    path = "/api/heroad/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    request_body = VehiclePayload,
    responses(
        (status = 200, description = "Veículo substituído", body = Vehicle),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<VehiclePayload>,
) -> Result<Json<Vehicle>, AppError> {
    let current = find_vehicle(&app_state, id).await?;
    Ok(Json(save(&app_state, &current, payload).await?))
}

// PATCH /api/heroad/vehicles/{id}
#[utoipa::path(
    patch,
    path = "/api/heroad/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    request_body = VehiclePayload,
    responses(
        (status = 200, description = "Veículo atualizado", body = Vehicle),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn partial_update_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<VehiclePayload>,
) -> Result<Json<Vehicle>, AppError> {
    let current = find_vehicle(&app_state, id).await?;
    let payload = payload.merged_onto(&current);
    Ok(Json(save(&app_state, &current, payload).await?))
}

// DELETE /api/heroad/vehicles/{id}
#[utoipa::path(
    delete,
    path = "/api/heroad/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 204, description = "Veículo, tournées e corridas ligadas foram apagados"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::Vehicle(id)).await? {
        return Err(AppError::NotFound("Veículo não encontrado."));
    }
    Ok(StatusCode::NO_CONTENT)
}
