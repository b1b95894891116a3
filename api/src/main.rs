use std::sync::Arc;

use actix_web::{web, HttpServer};
use tracing::{info, warn};

use tg_api::app::create_app;
use tg_api::routes::AppState;
use tg_api::telemetry;
use tg_core::repositories::{TokenRepository, UserRepository};
use tg_core::services::{
    AuthService, AuthServiceConfig, CredentialSigner, SessionService, TokenCleanupConfig,
    TokenCleanupService, TokenServiceConfig,
};
use tg_infra::database::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};
use tg_infra::memory::{InMemoryTokenRepository, InMemoryUserRepository};
use tg_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init(&config.logging)?;

    info!(environment = %config.environment, "Starting tokengate server");

    config.validate().map_err(anyhow::Error::msg)?;
    if config.auth.jwt.is_using_default_secret() {
        warn!("Signing with the default development secrets");
    }

    let signer = CredentialSigner::new(TokenServiceConfig::from(&config.auth.jwt))?;

    match config.database.clone() {
        Some(database) => {
            let pool = DatabasePool::new(database).await?;
            pool.run_migrations().await?;
            info!("{}", pool.get_statistics());

            let users = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
            let tokens = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
            let result = serve(&config, users, tokens, signer).await;

            pool.close().await;
            result
        }
        None => {
            warn!("DATABASE_URL not set, keeping users and tokens in process memory");
            let users = Arc::new(InMemoryUserRepository::new());
            let tokens = Arc::new(InMemoryTokenRepository::new());
            serve(&config, users, tokens, signer).await
        }
    }
}

/// Wire the services over the chosen stores and run the HTTP server until shutdown
async fn serve<U, T>(
    config: &AppConfig,
    users: Arc<U>,
    tokens: Arc<T>,
    signer: CredentialSigner,
) -> anyhow::Result<()>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    let session_service = Arc::new(SessionService::new(Arc::clone(&tokens), signer));
    let auth_service = Arc::new(AuthService::new(
        users,
        Arc::clone(&session_service),
        AuthServiceConfig::from(&config.auth.session),
    ));

    let cleanup = Arc::new(TokenCleanupService::new(
        tokens,
        TokenCleanupConfig::from(&config.auth.session),
    ));
    let cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(AppState::new(auth_service, session_service));
    let server_config = config.server.clone();
    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(app_state.clone(), &server_config));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    if let Some(task) = cleanup_task {
        task.abort();
    }
    info!("Server stopped");
    Ok(())
}
