//! ZooCollab Server: application entry point.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use zoocollab_db::{DbError, DbManager};
use zoocollab_server::{App, AppConfig, DEFAULT_CONFIG_FILE};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("database connection: {0}")]
    Connect(#[from] surrealdb::Error),

    #[error("schema migration: {0}")]
    Migrate(#[from] DbError),

    #[error("signal handling: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load(DEFAULT_CONFIG_FILE)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    tracing::info!("Starting ZooCollab server...");

    let db = DbManager::connect(&config.db).await?;
    zoocollab_db::run_migrations(&db.client()).await?;

    if config.auth.jwt_private_key_pem.is_empty() {
        tracing::warn!("No JWT signing key configured; registration and login will fail");
    }
    let _app = App::new(db.client(), config.auth);
    tracing::info!("Services ready");

    tokio::signal::ctrl_c().await?;

    tracing::info!("ZooCollab server stopped.");
    Ok(())
}
