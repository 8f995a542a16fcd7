pub mod address;
pub mod auth;
pub mod patient;
pub mod recipe;
pub mod run;
pub mod vehicle;

use crate::common::error::AppError;

/// Extrai um campo obrigatório de um payload já validado.
pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::missing_field(field))
}
