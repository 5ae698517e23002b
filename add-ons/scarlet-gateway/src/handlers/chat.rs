//! Chat and reload handlers: the two operations the assistant front-end calls.

use axum::extract::{Json, State};

use crate::AppState;

#[derive(serde::Deserialize)]
pub(crate) struct ChatRequest {
    /// Absent is treated as empty.
    #[serde(default)]
    message: Option<String>,
}

/// POST /chat – answers one message from the knowledge base, the web, or a generic reply.
pub(crate) async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> axum::Json<serde_json::Value> {
    let message = req.message.unwrap_or_default();
    let request_id = uuid::Uuid::new_v4();
    tracing::info!(
        target: "scarlet::gateway",
        %request_id,
        chars = message.chars().count(),
        "chat request received"
    );

    let reply = state.router.chat(&message).await;
    tracing::info!(target: "scarlet::gateway", %request_id, route = ?reply.route, "chat answered");

    axum::Json(serde_json::json!({ "response": reply.response }))
}

/// POST /reload – rebuilds the knowledge snapshot from the record store.
pub(crate) async fn reload(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let report = state.router.rebuild().await;
    axum::Json(serde_json::json!({
        "status": "reloaded",
        "items": report.items,
        "generation": report.generation,
    }))
}
