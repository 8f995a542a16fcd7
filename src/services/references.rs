// src/services/references.rs
//
// Resolve as referências de um payload antes de gravar. Um id que não existe vira
// erro de validação no campo correspondente (400), igual nos dois backends.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Record, Repository, UserRepository},
};

/// Carrega o registro referenciado em `field`.
pub async fn ensure_exists<T: Record>(
    repo: &dyn Repository<T>,
    field: &'static str,
    id: Uuid,
) -> Result<T, AppError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::unresolved_reference(field, id))
}

pub async fn ensure_all_exist<T: Record>(
    repo: &dyn Repository<T>,
    field: &'static str,
    ids: &[Uuid],
) -> Result<(), AppError> {
    for id in ids {
        if !repo.exists(*id).await? {
            return Err(AppError::unresolved_reference(field, *id));
        }
    }
    Ok(())
}

// Motoristas são contas, que vivem num repositório à parte
pub async fn ensure_users_exist(
    users: &dyn UserRepository,
    field: &'static str,
    ids: &[Uuid],
) -> Result<(), AppError> {
    for id in ids {
        if users.find_by_id(*id).await?.is_none() {
            return Err(AppError::unresolved_reference(field, *id));
        }
    }
    Ok(())
}
