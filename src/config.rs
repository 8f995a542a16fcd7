// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{db::Store, services::auth::AuthService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("STORAGE_BACKEND desconhecido: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub bind_addr: SocketAddr,
    pub media_root: PathBuf,
    pub superuser_email: Option<String>,
    pub superuser_password: Option<String>,
}

impl Config {
    /// Carrega o `.env` (se existir) e lê as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL deve ser definida"));
        }

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            storage_backend,
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            token_ttl_days: parse_or(&lookup, "TOKEN_TTL_DAYS", 7)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            media_root: lookup("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./media")),
            superuser_email: lookup("SUPERUSER_EMAIL"),
            superuser_password: lookup("SUPERUSER_PASSWORD"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} inválido ('{}'): {}", key, raw, e)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub auth_service: AuthService,
    // Só existe com o backend postgres (migrations, health)
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        match config.storage_backend {
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: nada será persistido.");
                Ok(Self::from_parts(config, Store::in_memory(), None))
            }
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let store = Store::postgres(db_pool.clone());
                Ok(Self::from_parts(config, store, Some(db_pool)))
            }
        }
    }

    /// Monta o gráfico de dependências a partir de um `Store` já pronto.
    pub fn from_parts(config: Config, store: Store, db_pool: Option<PgPool>) -> Self {
        let auth_service = AuthService::new(
            store.users.clone(),
            config.jwt_secret.clone(),
            config.token_ttl_days,
            config.bcrypt_cost,
        );

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/heroad"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.token_ttl_days, 7);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert!(config.superuser_email.is_none());
    }

    #[test]
    fn memory_backend_does_not_need_a_database() {
        let config = Config::from_vars(vars(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "segredo"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn missing_secret_or_bad_number_is_an_error() {
        assert!(Config::from_vars(vars(&[("STORAGE_BACKEND", "memory")])).is_err());
        assert!(Config::from_vars(vars(&[("JWT_SECRET", "segredo")])).is_err());
        assert!(Config::from_vars(vars(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "segredo"),
            ("TOKEN_TTL_DAYS", "sete"),
        ]))
        .is_err());
        assert!(Config::from_vars(vars(&[
            ("STORAGE_BACKEND", "mongo"),
            ("JWT_SECRET", "segredo"),
        ]))
        .is_err());
    }
}
