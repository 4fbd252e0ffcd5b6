// rest_api/src/main.rs

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use rest_api::{load_rest_api_config, start_server, StorageEngineType};
use storage::{AccountStore, MemoryStore, SledStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = load_rest_api_config(None).context("Failed to load REST API configuration")?;

    let engine = StorageEngineType::from_str(&config.storage_engine)
        .context("Invalid storage engine in configuration")?;
    let store: Arc<dyn AccountStore> = match engine {
        StorageEngineType::Memory => Arc::new(MemoryStore::new()),
        StorageEngineType::Sled => Arc::new(
            SledStore::open(&config.data_directory)
                .context("Failed to open sled account store")?,
        ),
    };
    tracing::info!(engine = %engine, "account store initialized");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    start_server(config, store, shutdown_rx).await
}
