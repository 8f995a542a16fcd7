// src/handlers/addresses.rs

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
    models::address::{Address, AddressPayload},
    services::{
        cascade::{self, Root},
        filters::AddressFilter,
    },
};

async fn find_address(app_state: &AppState, id: Uuid) -> Result<Address, AppError> {
    app_state
        .store
        .addresses
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Endereço não encontrado."))
}

async fn save(app_state: &AppState, current: &Address, payload: AddressPayload) -> Result<Address, AppError> {
    payload.validate()?;
    let record = payload.into_record(current.id, current.owner_id, current.created_at)?;

    app_state
        .store
        .addresses
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Endereço não encontrado."))
}

// GET /api/heroad/addresses
#[utoipa::path(
    get,
    path = "/api/heroad/addresses",
    tag = "Addresses",
    params(AddressFilter),
    responses(
        (status = 200, description = "Endereços", body = Vec<Address>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_addresses(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<AddressFilter>,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = app_state.store.addresses.list().await?;
    Ok(Json(filter.conditions().apply(addresses)))
}

// POST /api/heroad/addresses
#[utoipa::path(
    post,
    path = "/api/heroad/addresses",
    tag = "Addresses",
    request_body = AddressPayload,
    responses(
        (status = 201, description = "Endereço criado", body = Address),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_address(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<AddressPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = payload.into_record(Uuid::new_v4(), user.id, Utc::now())?;

    let address = app_state.store.addresses.insert(&record).await?;
    tracing::info!("📍 Endereço criado: {}", address);

    Ok((StatusCode::CREATED, Json(address)))
}

// GET /api/heroad/addresses/{id}
#[utoipa::path(
    get,
    path = "/api/heroad/addresses/{id}",
    tag = "Addresses",
    params(("id" = Uuid, Path, description = "ID do endereço")),
    responses(
        (status = 200, description = "Endereço", body = Address),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_address(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Address>, AppError> {
    Ok(Json(find_address(&app_state, id).await?))
}

// PUT /api/heroad/addresses/{id}
#[utoipa::path(
    put,
    path = "/api/heroad/addresses/{id}",
    tag = "Addresses",
    params(("id" = Uuid, Path, description = "ID do endereço")),
    request_body = AddressPayload,
    responses(
        (status = 200, description = "Endereço substituído", body = Address),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_address(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AddressPayload>,
) -> Result<Json<Address>, AppError> {
    let current = find_address(&app_state, id).await?;
    Ok(Json(save(&app_state, &current, payload).await?))
}

// PATCH /api/heroad/addresses/{id}
#[utoipa::path(
    patch,
    path = "/api/heroad/addresses/{id}",
    tag = "Addresses",
    params(("id" = Uuid, Path, description = "ID do endereço")),
    request_body = AddressPayload,
    responses(
        (status = 200, description = "Endereço atualizado", body = Address),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn partial_update_address(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AddressPayload>,
) -> Result<Json<Address>, AppError> {
    let current = find_address(&app_state, id).await?;
    let payload = payload.merged_onto(&current);
    Ok(Json(save(&app_state, &current, payload).await?))
}

// DELETE /api/heroad/addresses/{id}
#[utoipa::path(
    delete,
    path = "/api/heroad/addresses/{id}",
    tag = "Addresses",
    params(("id" = Uuid, Path, description = "ID do endereço")),
    responses(
        (status = 204, description = "Endereço, pacientes e corridas ligados foram apagados"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_address(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::Address(id)).await? {
        return Err(AppError::NotFound("Endereço não encontrado."));
    }
    Ok(StatusCode::NO_CONTENT)
}
