//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use heroad::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG sobrescreve o nível padrão
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!().run(pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    if let (Some(email), Some(password)) = (
        app_state.config.superuser_email.as_deref(),
        app_state.config.superuser_password.as_deref(),
    ) {
        if let Some(admin) = app_state.auth_service.create_superuser(email, password).await? {
            tracing::info!("🔑 Superusuário criado: {}", admin.email);
        }
    }

    // Inicia o servidor
    let listener = TcpListener::bind(app_state.config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, heroad::app(app_state)).await?;
    Ok(())
}
