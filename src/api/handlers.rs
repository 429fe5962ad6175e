//! HTTP request handlers

use super::AppState;
use crate::transport::Update;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tower_http::trace::TraceLayer;

/// Create the webhook router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/telegram/webhook", post(receive_update))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn receive_update(State(state): State<AppState>, Json(update): Json<Update>) -> Result<StatusCode, AppError> {
    let update_id = update.update_id;
    let Some(event) = update.into_inbound() else {
        // Acknowledge anyway so Telegram does not redeliver it
        tracing::debug!(update_id, "Ignoring unsupported update");
        return Ok(StatusCode::OK);
    };

    match state.queue.try_send(event) {
        Ok(()) => Ok(StatusCode::OK),
        Err(TrySendError::Full(_)) => {
            tracing::warn!(update_id, "Worker queue full, asking for redelivery");
            Err(AppError::Unavailable("Bot is busy".to_string()))
        }
        Err(TrySendError::Closed(_)) => Err(AppError::Unavailable("Bot is shutting down".to_string())),
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn get_version() -> &'static str {
    concat!("shopbot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

enum AppError {
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
