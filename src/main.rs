mod config;
mod domain;
mod entity;
mod infrastructure;
mod presentation;
mod usecase;

use axum::Router;
use sea_orm::{ConnectOptions, Database};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::AppConfig,
    infrastructure::{
        argon2_password_hasher::Argon2PasswordHasher, user_repository::PostgresUserRepository,
    },
    presentation::handlers::user_handler::create_user_router,
    usecase::{authenticate_usecase::AuthenticateUsecase, user_usecase::UserUsecase},
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_tracing();
    tracing::info!("Booting User Service...");

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    let user_repository = PostgresUserRepository::new(db);
    user_repository.ensure_schema().await?;

    let password_hasher = Argon2PasswordHasher::new();
    let user_service = UserUsecase::new(user_repository.clone(), password_hasher.clone());
    let authenticate_service = AuthenticateUsecase::new(user_repository, password_hasher);

    let app = Router::new().nest(
        "/api/v1",
        create_user_router(user_service, authenticate_service),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "User Service online and ready to serve");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
