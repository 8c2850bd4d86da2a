use crate::configuration::Context;
use crate::whitelist::WhitelistStore;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub mod auth;
mod file_serve;
mod handlers;
pub mod payload;

use auth::SharedSecret;
use file_serve::{serve_index, serve_static_file};
use handlers::{add_user, health_check, remove_user, verify_user, whitelist_stats};
use payload::ApiResponse;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<WhitelistStore>,
    pub secret: SharedSecret,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(context: &Context, store: Arc<WhitelistStore>) -> Self {
        Self {
            store,
            secret: context.secret.clone(),
            static_dir: context.config.static_dir.clone(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/verify-user", post(verify_user))
        .route("/add-user", post(add_user))
        .route("/remove-user", post(remove_user))
        .route("/whitelist-stats", get(whitelist_stats));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_check))
        .route("/", get(serve_index))
        .route("/{filename}", get(serve_static_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// Panics in a handler become a generic 500; details stay in the log
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(detail = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("Internal server error")),
    )
        .into_response()
}
