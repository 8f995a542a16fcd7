// src/db/repository.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{auth::User, run::Run},
};

/// Um registro com dono. Todas as entidades da API implementam.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
}

/// Contrato de persistência de uma tabela. O Postgres e a memória implementam.
///
/// O id, o dono e o `created_at` já vêm preenchidos no registro; o repositório só grava.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn insert(&self, record: &T) -> Result<T, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, AppError>;

    /// Todos os registros, em ordem de criação.
    async fn list(&self) -> Result<Vec<T>, AppError>;

    /// Substitui o registro inteiro. `None` se o id não existe.
    async fn update(&self, record: &T) -> Result<Option<T>, AppError>;

    /// Apaga os ids informados e devolve quantos existiam.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.delete_many(&[id]).await? > 0)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Corridas também são lidas pela tournée a que pertencem.
#[async_trait]
pub trait RunRepository: Repository<Run> {
    /// Corridas de qualquer uma das tournées informadas, em ordem de criação.
    async fn list_by_master_runs(&self, master_run_ids: &[Uuid]) -> Result<Vec<Run>, AppError>;
}

// Contas não têm dono, então ficam num contrato próprio
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Falha com `EmailAlreadyExists` se o e-mail já estiver em uso.
    async fn create_user(&self, user: &User) -> Result<User, AppError>;

    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError>;

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}
