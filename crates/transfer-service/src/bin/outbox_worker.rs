//! Outbox relay worker for the transfer service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use outbox::{OutboxRelay, PgOutboxStore, RabbitConfig, RabbitPublisher, RelayConfig};
use outbox_shared::shutdown::shutdown_signal;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use transfer_service::config::ServiceConfig;

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
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url())
        .await
        .context("connect to database")?;
    info!("connected to database");

    let store = PgOutboxStore::new(pool.clone());
    store.run_migrations().await.context("run outbox migrations")?;

    let publisher = RabbitPublisher::new(RabbitConfig::new(
        config.broker.url.clone(),
        config.broker.exchange.clone(),
    ));
    publisher.connect().await.context("connect to rabbitmq")?;
    info!(exchange = %config.broker.exchange, "connected to rabbitmq");

    let relay = OutboxRelay::new(
        Arc::new(store),
        Arc::new(publisher),
        RelayConfig {
            poll_interval: config.worker.poll_interval,
            batch_size: config.worker.batch_size,
            max_retries: config.worker.max_retries,
            ..RelayConfig::default()
        },
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    relay.run(shutdown).await;
    info!("outbox worker stopped");
    Ok(())
}
