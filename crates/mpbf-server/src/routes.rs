//! Route definitions and handlers.

use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use mpbf_core::{PendingAction, UserCommand};
use mpbf_pipeline::{CommandResponse, ExecutionReply};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

/// Confirmation request: the pending action exactly as it was handed out.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "pendingAction")]
    pub pending_action: PendingAction,
}

/// Build the assistant router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/assistant/command", post(handle_command))
        .route("/api/assistant/confirm", post(handle_confirm))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_command(
    State(state): State<AppState>,
    Json(command): Json<UserCommand>,
) -> Json<CommandResponse> {
    Json(state.pipeline.handle_user_command(&command).await)
}

async fn handle_confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Json<ExecutionReply> {
    Json(
        state
            .pipeline
            .confirm_and_execute(request.user_id, &request.pending_action)
            .await,
    )
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": "mpbf-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
