pub mod api;
pub mod configuration;
pub mod core;
pub mod whitelist;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config Error:{0}")]
    ConfigError(String),

    #[error("Store Error:{0}")]
    StoreError(String),

    #[error("Service error")]
    ServiceError,
}
