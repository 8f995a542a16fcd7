// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{normalize_email, Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    token_ttl_days: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        token_ttl_days: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl_days,
            bcrypt_cost,
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
        superuser: bool,
    ) -> Result<User, AppError> {
        let email = normalize_email(email);
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_hash = self.hash_password(password).await?;

        let user = User {
            id: Uuid::new_v4(),
            email,
            name: name.unwrap_or_default(),
            is_active: true,
            is_staff: superuser,
            is_superuser: superuser,
            password_hash,
            created_at: Utc::now(),
        };

        self.user_repo.create_user(&user).await
    }

    /// Cria a conta e devolve um token já válido.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<String, AppError> {
        let user = self.create_account(email, password, name, false).await?;
        tracing::info!("👤 Nova conta registrada: {}", user.id);
        self.create_token(user.id)
    }

    /// Superusuário de bootstrap. Não faz nada se o e-mail já existe.
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        match self.create_account(email, password, None, true).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::EmailAlreadyExists) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    /// Decodifica o token e carrega a conta. Conta apagada ou desativada é token inválido.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        match self.user_repo.find_by_id(token_data.claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::InvalidToken),
        }
    }

    /// PATCH /api/users/me: nome e/ou senha.
    pub async fn update_profile(
        &self,
        user: &User,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<User, AppError> {
        let mut updated = user.clone();
        if let Some(name) = name {
            updated.name = name;
        }
        if let Some(password) = password {
            updated.password_hash = self.hash_password(&password).await?;
        }

        self.user_repo
            .update_user(&updated)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.token_ttl_days);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryUserRepository;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryUserRepository::new()),
            "segredo-de-teste".to_string(),
            7,
            4,
        )
    }

    #[tokio::test]
    async fn register_then_login_yields_a_valid_token() {
        let auth = service();
        auth.register_user("test@HEROAD.fr", "testpass123", Some("Test".into()))
            .await
            .unwrap();

        let token = auth.login_user("test@heroad.fr", "testpass123").await.unwrap();
        let user = auth.validate_token(&token).await.unwrap();

        assert_eq!(user.email, "test@heroad.fr");
        assert_eq!(user.name, "Test");
        assert!(!user.is_superuser);
        assert_ne!(user.password_hash, "testpass123");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service();
        auth.register_user("dup@heroad.fr", "testpass123", None).await.unwrap();

        let err = auth
            .register_user("dup@HEROAD.FR", "otherpass", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let auth = service();
        auth.register_user("a@heroad.fr", "testpass123", None).await.unwrap();

        let err = auth.login_user("a@heroad.fr", "wrongpass").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = auth.login_user("nobody@heroad.fr", "testpass123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn garbage_and_foreign_tokens_are_rejected() {
        let auth = service();
        assert!(matches!(
            auth.validate_token("nao-e-um-jwt").await.unwrap_err(),
            AppError::InvalidToken
        ));

        // Token bem formado, mas de uma conta que não existe
        let orphan = auth.create_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            auth.validate_token(&orphan).await.unwrap_err(),
            AppError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn superuser_bootstrap_is_idempotent() {
        let auth = service();
        let created = auth.create_superuser("admin@heroad.fr", "adminpass").await.unwrap();
        let admin = created.expect("first call creates the account");
        assert!(admin.is_superuser && admin.is_staff);

        let again = auth.create_superuser("admin@heroad.fr", "adminpass").await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn profile_update_changes_name_and_password() {
        let auth = service();
        let token = auth.register_user("me@heroad.fr", "oldpass1", None).await.unwrap();
        let user = auth.validate_token(&token).await.unwrap();

        let updated = auth
            .update_profile(&user, Some("Novo Nome".into()), Some("newpass1".into()))
            .await
            .unwrap();
        assert_eq!(updated.name, "Novo Nome");

        assert!(auth.login_user("me@heroad.fr", "oldpass1").await.is_err());
        assert!(auth.login_user("me@heroad.fr", "newpass1").await.is_ok());
    }
}
