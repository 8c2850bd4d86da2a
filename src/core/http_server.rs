use crate::api::{router, AppState};
use crate::configuration::Context;
use crate::core::service_manager::{Error as ServiceManagerError, Service};
use crate::whitelist::WhitelistStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

pub struct HttpService {
    port: u16,
    state: AppState,
}

#[async_trait]
impl Service for HttpService {
    type Context = (Context, Arc<WhitelistStore>);

    async fn new(context: Self::Context) -> Self {
        let (context, store) = context;
        Self {
            port: context.config.port,
            state: AppState::new(&context, store),
        }
    }

    async fn run(self) -> Result<(), ServiceManagerError> {
        let app = router(self.state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", self.port))
            .await
            .map_err(|e| ServiceManagerError::new(&format!("Failed to bind port: {}", e)))?;

        info!("HTTP server running on port {}", self.port);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServiceManagerError::new(&format!("HTTP server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
