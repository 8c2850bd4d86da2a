use super::payload::{AddUserRequest, ApiResponse, RemoveUserRequest, VerifyUserRequest};
use super::AppState;
use crate::whitelist::{operations, WhitelistStats};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

const INVALID_ID: &str = "Invalid Telegram ID format";
const INTERNAL_ERROR: &str = "Internal server error";

fn reply(status: StatusCode, body: ApiResponse) -> Response {
    (status, Json(body)).into_response()
}

fn internal_error() -> Response {
    reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiResponse::error(INTERNAL_ERROR),
    )
}

fn unauthorized() -> Response {
    reply(StatusCode::UNAUTHORIZED, ApiResponse::error("Unauthorized"))
}

fn invalid_body(rejection: JsonRejection) -> Response {
    warn!(error = %rejection, "Rejected request body");
    reply(
        StatusCode::BAD_REQUEST,
        ApiResponse::error("Invalid request body"),
    )
}

pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

// Open endpoint used by the mini app to decide whether to let a user in
pub async fn verify_user(
    State(state): State<AppState>,
    payload: Result<Json<VerifyUserRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_body(rejection),
    };

    let telegram_id = match request.telegram_id {
        Some(id) if operations::is_valid_telegram_id(&id) => id,
        _ => return reply(StatusCode::BAD_REQUEST, ApiResponse::error(INVALID_ID)),
    };

    let session = state.store.session().await;
    let mut doc = match session.load_for_read().await {
        Ok(doc) => doc,
        Err(e) => {
            error!(error = %e, "Whitelist unavailable during verification");
            return internal_error();
        }
    };

    match operations::verify(&mut doc, &telegram_id, Utc::now()) {
        Some(user) => {
            // The access decision stands even if the login stamp is lost
            if session.save(&mut doc).await.is_err() {
                warn!(telegram_id = %telegram_id, "Could not record last login");
            }
            info!(telegram_id = %telegram_id, "Access granted");
            reply(StatusCode::OK, ApiResponse::verified(user.summary()))
        }
        None => {
            info!(telegram_id = %telegram_id, "Access denied");
            reply(
                StatusCode::FORBIDDEN,
                ApiResponse::error("Access denied. User is not whitelisted."),
            )
        }
    }
}

pub async fn add_user(
    State(state): State<AppState>,
    payload: Result<Json<AddUserRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_body(rejection),
    };

    if !request
        .secret_key
        .as_deref()
        .is_some_and(|key| state.secret.matches(key))
    {
        warn!("Rejected add-user call with invalid secret");
        return unauthorized();
    }

    let telegram_id = match request.telegram_id {
        Some(id) if operations::is_valid_telegram_id(&id) => id,
        _ => return reply(StatusCode::BAD_REQUEST, ApiResponse::error(INVALID_ID)),
    };

    let session = state.store.session().await;
    // A corrupt file is never written back over; a missing one starts fresh
    let mut doc = match session.load_for_write().await {
        Ok(doc) => doc,
        Err(e) => {
            error!(telegram_id = %telegram_id, error = %e, "Cannot add user, whitelist unreadable");
            return internal_error();
        }
    };

    let user = operations::upsert(
        &mut doc,
        &telegram_id,
        request.username.as_deref().unwrap_or_default(),
        request.first_name.as_deref().unwrap_or_default(),
        Utc::now(),
    );

    if session.save(&mut doc).await.is_err() {
        return reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::error("Failed to save whitelist"),
        );
    }

    info!(telegram_id = %telegram_id, username = %user.username, "User added to whitelist");
    reply(
        StatusCode::OK,
        ApiResponse::ok(&format!("User {} added to whitelist", telegram_id)),
    )
}

pub async fn remove_user(
    State(state): State<AppState>,
    payload: Result<Json<RemoveUserRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_body(rejection),
    };

    if !request
        .secret_key
        .as_deref()
        .is_some_and(|key| state.secret.matches(key))
    {
        warn!("Rejected remove-user call with invalid secret");
        return unauthorized();
    }

    // Presence only: removal accepts ids in any format
    let telegram_id = match request.telegram_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return reply(
                StatusCode::BAD_REQUEST,
                ApiResponse::error("Telegram ID is required"),
            )
        }
    };

    let session = state.store.session().await;
    let mut doc = match session.load_for_write().await {
        Ok(doc) => doc,
        Err(e) => {
            error!(telegram_id = %telegram_id, error = %e, "Cannot remove user, whitelist unreadable");
            return internal_error();
        }
    };

    if !operations::deactivate(&mut doc, &telegram_id) {
        info!(telegram_id = %telegram_id, "Remove requested for unknown user");
        return reply(
            StatusCode::OK,
            ApiResponse::ok(&format!("User {} is not in the whitelist", telegram_id)),
        );
    }

    if session.save(&mut doc).await.is_err() {
        return reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::error("Failed to save whitelist"),
        );
    }

    info!(telegram_id = %telegram_id, "User removed from whitelist");
    reply(
        StatusCode::OK,
        ApiResponse::ok(&format!("User {} removed from whitelist", telegram_id)),
    )
}

pub async fn whitelist_stats(
    State(state): State<AppState>,
) -> Result<Json<WhitelistStats>, Response> {
    let session = state.store.session().await;
    let doc = session.load_for_read().await.map_err(|e| {
        error!(error = %e, "Whitelist unavailable for stats");
        internal_error()
    })?;
    Ok(Json(operations::stats(&doc)))
}
