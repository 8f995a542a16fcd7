// src/db/memory.rs
//
// Armazenamento em memória. Usado nos testes e com STORAGE_BACKEND=memory.
// Não existem chaves estrangeiras aqui: os handlers resolvem as referências
// antes de gravar e a cascata é feita pelo services::cascade.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::{Record, Repository, RunRepository, UserRepository},
    models::{auth::User, run::Run},
};

pub struct MemoryRepository<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn insert(&self, record: &T) -> Result<T, AppError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == record.id()) {
            return Err(anyhow::anyhow!("id duplicado: {}", record.id()).into());
        }
        rows.push(record.clone());
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>, AppError> {
        Ok(self.rows.read().await.clone())
    }

    async fn update(&self, record: &T) -> Result<Option<T>, AppError> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| row.id() == record.id()) {
            Some(row) => {
                *row = record.clone();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !ids.contains(&row.id()));
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl RunRepository for MemoryRepository<Run> {
    async fn list_by_master_runs(&self, master_run_ids: &[Uuid]) -> Result<Vec<Run>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|run| master_run_ids.contains(&run.master_run_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email && u.id != user.id) {
            return Err(AppError::EmailAlreadyExists);
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}
