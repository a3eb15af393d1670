//! Users service HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use outbox::PgOutboxStore;
use outbox_shared::shutdown::shutdown_signal;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use users_service::application::CreateUser;
use users_service::config::ServiceConfig;
use users_service::domain::UserRepository;
use users_service::http::{self, AppState};
use users_service::infrastructure::PostgresUserRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = ServiceConfig::load().context("load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.pool_size)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url())
        .await
        .context("connect to database")?;
    info!("connected to database");

    let repository = PostgresUserRepository::new(pool.clone());
    repository.run_migrations().await.context("run migrations")?;
    PgOutboxStore::new(pool.clone())
        .run_migrations()
        .await
        .context("run outbox migrations")?;

    let repository: Arc<dyn UserRepository> = Arc::new(repository);
    let state = AppState {
        create: Arc::new(CreateUser::new(repository)),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "starting HTTP server");

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP")?;

    info!("server stopped");
    Ok(())
}
