use dotenvy::dotenv;
use gatekeeper::configuration::Context;
use gatekeeper::core::{HttpService, ServiceManager};
use gatekeeper::whitelist::WhitelistStore;
use gatekeeper::AppError;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let context = Context::from_env().map_err(|e| AppError::ConfigError(e.to_string()))?;

    let log_level = Level::from_str(&context.config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(log_level.to_string()))
        .init();
    tracing::info!("Starting whitelist gate");

    let store = Arc::new(WhitelistStore::new(
        context.config.whitelist_file.clone(),
        context.config.read_policy,
    ));
    store
        .ensure_exists()
        .await
        .map_err(|e| AppError::StoreError(e.to_string()))?;
    tracing::info!(
        path = %store.path().display(),
        read_policy = ?store.read_policy(),
        "Whitelist store ready"
    );

    let mut service_manager = ServiceManager::new((context, store));
    service_manager.spawn::<HttpService>();

    service_manager
        .wait()
        .await
        .map_err(|_| AppError::ServiceError)
}
