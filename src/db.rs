pub mod repository;
pub use repository::{Record, Repository, RunRepository, UserRepository};
pub mod memory;
pub mod user_repo;
pub mod address_repo;
pub mod vehicle_repo;
pub mod patient_repo;
pub mod run_repo;
pub mod master_run_repo;
pub mod recipe_repo;

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        address::Address,
        patient::Patient,
        recipe::{Ingredient, Recipe, Tag},
        run::{MasterRun, Run},
        vehicle::Vehicle,
    },
};

use self::{
    address_repo::PgAddressRepository,
    master_run_repo::PgMasterRunRepository,
    memory::{MemoryRepository, MemoryUserRepository},
    patient_repo::PgPatientRepository,
    recipe_repo::{PgIngredientRepository, PgRecipeRepository, PgTagRepository},
    run_repo::PgRunRepository,
    user_repo::PgUserRepository,
    vehicle_repo::PgVehicleRepository,
};

// Chave estrangeira quebrada vira 400: o cliente mandou um id que não existe
pub(crate) fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidPayload(format!(
                "Referência inválida ({})",
                db_err.constraint().unwrap_or("chave estrangeira")
            ));
        }
    }
    e.into()
}

/// Todos os repositórios da aplicação, atrás dos contratos de `repository`.
///
/// `pool` só existe no Postgres: a cascata abre a transação nele.
#[derive(Clone)]
pub struct Store {
    pub pool: Option<PgPool>,
    pub users: Arc<dyn UserRepository>,
    pub addresses: Arc<dyn Repository<Address>>,
    pub vehicles: Arc<dyn Repository<Vehicle>>,
    pub patients: Arc<dyn Repository<Patient>>,
    pub runs: Arc<dyn RunRepository>,
    pub master_runs: Arc<dyn Repository<MasterRun>>,
    pub tags: Arc<dyn Repository<Tag>>,
    pub ingredients: Arc<dyn Repository<Ingredient>>,
    pub recipes: Arc<dyn Repository<Recipe>>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self {
            pool: None,
            users: Arc::new(MemoryUserRepository::new()),
            addresses: Arc::new(MemoryRepository::<Address>::new()),
            vehicles: Arc::new(MemoryRepository::<Vehicle>::new()),
            patients: Arc::new(MemoryRepository::<Patient>::new()),
            runs: Arc::new(MemoryRepository::<Run>::new()),
            master_runs: Arc::new(MemoryRepository::<MasterRun>::new()),
            tags: Arc::new(MemoryRepository::<Tag>::new()),
            ingredients: Arc::new(MemoryRepository::<Ingredient>::new()),
            recipes: Arc::new(MemoryRepository::<Recipe>::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            addresses: Arc::new(PgAddressRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            patients: Arc::new(PgPatientRepository::new(pool.clone())),
            runs: Arc::new(PgRunRepository::new(pool.clone())),
            master_runs: Arc::new(PgMasterRunRepository::new(pool.clone())),
            tags: Arc::new(PgTagRepository::new(pool.clone())),
            ingredients: Arc::new(PgIngredientRepository::new(pool.clone())),
            recipes: Arc::new(PgRecipeRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }
}
