mod activity;
mod advisory;
mod clients;
mod common;
mod config;
mod contractors;
mod external;
mod farms;
mod parcels;
mod products;
mod routes;
mod services;
mod stats;
mod treatments;

#[cfg(test)]
mod test_helpers;

use crate::config::Config;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config: Config = Config::from_env();

    let db: DatabaseConnection = Database::connect(config.db_url.as_str()).await?;

    if db.ping().await.is_ok() {
        tracing::info!("Connected to the database");
    } else {
        tracing::warn!("Could not ping the database");
    }

    Migrator::up(&db, None).await?;
    tracing::info!("DB migrations complete");

    tracing::info!(
        "Starting server {} ({} deployment) ...",
        config.app_name,
        config.deployment.to_uppercase()
    );

    let addr: std::net::SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {addr}");

    let router = routes::build_router(&db, &config);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        router.into_make_service(),
    )
    .await?;

    Ok(())
}
